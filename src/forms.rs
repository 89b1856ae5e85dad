//! Client-side form checks.
//!
//! Each form turns raw user input into a gateway request or rejects it with
//! a `ValidationError` before anything is sent.

use time::Date;
use time::macros::format_description;

use crate::api::types::{BookingRequest, CarInput, LoginRequest, RegisterRequest};
use crate::error::ValidationError;
use crate::session::Role;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_DAILY_PRICE: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn into_request(self) -> Result<LoginRequest, ValidationError> {
        let email = check_email(&self.email)?;
        check_password(&self.password)?;
        Ok(LoginRequest {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn into_request(self) -> Result<RegisterRequest, ValidationError> {
        let name = required("name", &self.name)?;
        let email = check_email(&self.email)?;
        check_password(&self.password)?;
        let role = required("role", &self.role)?.parse::<Role>()?;
        Ok(RegisterRequest {
            name,
            email,
            password: self.password,
            role,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub car_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl BookingForm {
    /// # Errors
    ///
    /// Returns the first failing field check, including an end date earlier
    /// than the start date.
    pub fn into_request(self) -> Result<BookingRequest, ValidationError> {
        let car_id = required("carId", &self.car_id)?;
        let start = parse_date("startDate", &self.start_date)?;
        let end = parse_date("endDate", &self.end_date)?;
        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(BookingRequest {
            car_id,
            start_date: self.start_date.trim().to_owned(),
            end_date: self.end_date.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CarForm {
    pub name: String,
    pub car_type: String,
    pub price: String,
}

impl CarForm {
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn into_input(self) -> Result<CarInput, ValidationError> {
        let name = required("name", &self.name)?;
        let car_type = required("type", &self.car_type)?;
        let raw_price = required("price", &self.price)?;
        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ValidationError::PriceNotNumeric)?;
        if price < f64::from(MIN_DAILY_PRICE) {
            return Err(ValidationError::PriceTooLow {
                min: MIN_DAILY_PRICE,
            });
        }
        Ok(CarInput {
            name,
            car_type,
            price,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_owned())
}

fn check_email(raw: &str) -> Result<String, ValidationError> {
    let email = required("email", raw)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

fn parse_date(field: &'static str, raw: &str) -> Result<Date, ValidationError> {
    let value = required(field, raw)?;
    Date::parse(&value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate { field, value })
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
