//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::SessionId;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::entity::{
    employee::EmployeeProfile,
    otp::{NewOtp, OtpLookup, OtpRecord, OtpStatus},
    session::SessionRecord,
};
use crate::domain::repository::{
    ApiPolicyRepository, EmployeeRepository, OtpRepository, SessionRepository,
};
use crate::domain::value_object::{
    api_access::{ApiAccessRequest, PolicyVerdict},
    idle_timeout::IdleTimeout,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

async fn supersede_with<'e>(
    executor: impl PgExecutor<'e>,
    employee_id: &str,
    at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE session_data SET
            is_active = 0,
            idletimeout = $2,
            logout_date = $3
        WHERE employee_id = $1 AND is_active = 1
        "#,
    )
    .bind(employee_id)
    .bind(IdleTimeout::Idle.id())
    .bind(at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_with<'e>(
    executor: impl PgExecutor<'e>,
    session: &SessionRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO session_data (
            session_id,
            department,
            username,
            user_id,
            employee_id,
            is_active,
            idletimeout,
            login_date,
            logout_date
        ) VALUES ($1, $2, $3, $1, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(session.session_id.as_uuid())
    .bind(&session.scope_tag)
    .bind(&session.username)
    .bind(&session.employee_id)
    .bind(i16::from(session.active))
    .bind(session.idle_timeout.id())
    .bind(session.login_at)
    .bind(session.logout_at)
    .execute(executor)
    .await?;

    Ok(())
}

impl SessionRepository for PgAuthRepository {
    async fn replace_active(&self, session: &SessionRecord) -> AuthResult<u64> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent logins of the same employee
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&session.employee_id)
            .execute(&mut *tx)
            .await?;

        let superseded = supersede_with(&mut *tx, &session.employee_id, session.login_at).await?;
        insert_with(&mut *tx, session).await?;

        tx.commit().await?;

        Ok(superseded)
    }

    async fn supersede_active(&self, employee_id: &str, at: DateTime<Utc>) -> AuthResult<u64> {
        Ok(supersede_with(&self.pool, employee_id, at).await?)
    }

    async fn insert(&self, session: &SessionRecord) -> AuthResult<()> {
        Ok(insert_with(&self.pool, session).await?)
    }

    async fn close(
        &self,
        session_id: &SessionId,
        idle_timeout: IdleTimeout,
        at: DateTime<Utc>,
    ) -> AuthResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE session_data SET
                is_active = 0,
                idletimeout = $2,
                logout_date = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(idle_timeout.id())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Vec<SessionRecord>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                department,
                username,
                employee_id,
                is_active,
                idletimeout,
                login_date,
                logout_date
            FROM session_data
            WHERE session_id = $1
            ORDER BY login_date
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }
}

// ============================================================================
// OTP Repository Implementation
// ============================================================================

const OTP_COLUMNS: &str = "id, username, mobileno, otp, otpsendon, otpverifiedon, status, otpvalidtill, session_id, resend";

impl OtpRepository for PgAuthRepository {
    async fn create(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord> {
        let row = sqlx::query_as::<_, OtpRow>(&format!(
            r#"
            INSERT INTO otp_details (
                username, mobileno, otp, otpsendon, status, otpvalidtill, session_id, resend
            ) VALUES ($1, $2, $3, $4, 0, $5, $6, 1)
            RETURNING {OTP_COLUMNS}
            "#
        ))
        .bind(&otp.username)
        .bind(&otp.mobile_no)
        .bind(otp.otp)
        .bind(sent_at)
        .bind(valid_until)
        .bind(&otp.session_id)
        .fetch_one(&self.pool)
        .await?;

        row.into_otp()
    }

    async fn create_resend(
        &self,
        otp: &NewOtp,
        sent_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> AuthResult<OtpRecord> {
        let row = sqlx::query_as::<_, OtpRow>(&format!(
            r#"
            INSERT INTO otp_details (
                username, mobileno, otp, otpsendon, status, otpvalidtill, session_id, resend
            )
            SELECT $1, $2, $3, $4, 0, $5, $6, COALESCE(MAX(resend), 0) + 1
            FROM otp_details
            WHERE session_id = $6 AND username = $1 AND mobileno = $2
            RETURNING {OTP_COLUMNS}
            "#
        ))
        .bind(&otp.username)
        .bind(&otp.mobile_no)
        .bind(otp.otp)
        .bind(sent_at)
        .bind(valid_until)
        .bind(&otp.session_id)
        .fetch_one(&self.pool)
        .await?;

        row.into_otp()
    }

    async fn consume_latest(
        &self,
        lookup: &OtpLookup,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<OtpRecord>> {
        // Consume the newest matching row and retire its pending siblings in
        // one statement. A concurrent submission blocks on the row lock and
        // then no longer sees a pending row.
        let row = sqlx::query_as::<_, OtpRow>(&format!(
            r#"
            WITH consumed AS (
                UPDATE otp_details SET
                    status = 1,
                    otpverifiedon = $5
                WHERE id = (
                    SELECT id FROM otp_details
                    WHERE username = $1
                      AND mobileno = $2
                      AND session_id = $3
                      AND otp = $4
                      AND status = 0
                      AND otpverifiedon IS NULL
                      AND otpvalidtill >= $5
                    ORDER BY otpsendon DESC, id DESC
                    LIMIT 1
                    FOR UPDATE
                )
                RETURNING {OTP_COLUMNS}
            ),
            retired AS (
                UPDATE otp_details o SET status = 2
                FROM consumed c
                WHERE o.username = c.username
                  AND o.mobileno = c.mobileno
                  AND o.session_id = c.session_id
                  AND o.status = 0
                  AND o.id <> c.id
            )
            SELECT {OTP_COLUMNS} FROM consumed
            "#
        ))
        .bind(&lookup.username)
        .bind(&lookup.mobile_no)
        .bind(&lookup.session_id)
        .bind(lookup.otp)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OtpRow::into_otp).transpose()
    }
}

// ============================================================================
// Employee Repository Implementation
// ============================================================================

impl EmployeeRepository for PgAuthRepository {
    async fn find_profile(&self, login_name: &str) -> AuthResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT
                employeeid::text AS employee_id,
                COALESCE(mobilenumber::text, '') AS mobile_number
            FROM employeebasicinfo
            WHERE loginname = $1
            LIMIT 1
            "#,
        )
        .bind(login_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| EmployeeProfile {
            employee_id: r.employee_id,
            mobile_number: r.mobile_number,
        }))
    }
}

// ============================================================================
// API Policy Repository Implementation
// ============================================================================

impl ApiPolicyRepository for PgAuthRepository {
    async fn check(&self, request: &ApiAccessRequest) -> AuthResult<String> {
        let status = sqlx::query_scalar::<_, Option<String>>("SELECT api_validation($1, $2, $3)")
            .bind(&request.api_name)
            .bind(&request.client_ip)
            .bind(&request.access_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(status.unwrap_or_default())
    }

    async fn record(&self, request: &ApiAccessRequest, status: &str) -> AuthResult<()> {
        let (status, error) = if status == PolicyVerdict::SUCCESS {
            (status, "")
        } else {
            ("", status)
        };

        sqlx::query(
            r#"
            INSERT INTO client_request (
                ip_address,
                request_data,
                response_data,
                status,
                error,
                request_on,
                response_on,
                updated_on
            ) VALUES ($1, $2, '', $3, $4, NOW(), NOW(), NOW())
            "#,
        )
        .bind(&request.client_ip)
        .bind(&request.request_url)
        .bind(status)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    department: String,
    username: String,
    employee_id: String,
    is_active: i16,
    idletimeout: i16,
    login_date: DateTime<Utc>,
    logout_date: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> SessionRecord {
        SessionRecord {
            session_id: SessionId::from_uuid(self.session_id),
            employee_id: self.employee_id,
            username: self.username,
            scope_tag: self.department,
            active: self.is_active == 1,
            idle_timeout: IdleTimeout::from_id(self.idletimeout),
            login_at: self.login_date,
            logout_at: self.logout_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: i64,
    username: String,
    mobileno: String,
    otp: i32,
    otpsendon: DateTime<Utc>,
    otpverifiedon: Option<DateTime<Utc>>,
    status: i16,
    otpvalidtill: DateTime<Utc>,
    session_id: String,
    resend: i32,
}

impl OtpRow {
    fn into_otp(self) -> AuthResult<OtpRecord> {
        let status = OtpStatus::from_id(self.status)
            .ok_or_else(|| AuthError::Internal(format!("Invalid OTP status: {}", self.status)))?;

        Ok(OtpRecord {
            id: self.id,
            username: self.username,
            mobile_no: self.mobileno,
            otp: self.otp,
            sent_at: self.otpsendon,
            verified_at: self.otpverifiedon,
            status,
            valid_until: self.otpvalidtill,
            session_id: self.session_id,
            resend: self.resend,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: String,
    mobile_number: String,
}
