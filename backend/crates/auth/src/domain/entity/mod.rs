//! Entity Module

pub mod employee;
pub mod otp;
pub mod session;
