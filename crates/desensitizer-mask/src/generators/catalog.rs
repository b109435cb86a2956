use std::sync::Arc;

use chrono::{Days, NaiveDate};
use fake::Fake;
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryName, StateAbbr, StreetName, ZipCode,
};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use desensitizer_config::BLANK_TYPE;
use desensitizer_core::CellValue;

use crate::errors::GeneratorError;
use crate::generators::{Generator, GeneratorRegistry, seeded_rng};

const CHECK_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DATE_SPAN_DAYS: u64 = 20_453; // 1970-01-01 ..= 2025-12-31

type Produce = fn(&mut ChaCha8Rng) -> Result<CellValue, GeneratorError>;

pub fn register(registry: &mut GeneratorRegistry) {
    let entries: &[(&'static str, Produce)] = &[
        ("company", company),
        ("first_name", first_name),
        ("last_name", last_name),
        ("name", full_name),
        ("email", email),
        ("phone", phone),
        ("address", address),
        ("city", city),
        ("state", state),
        ("postal_code", postal_code),
        ("country", country),
        ("float", float),
        ("date", date),
        ("check", check),
        ("gender", gender),
    ];
    for &(type_tag, produce) in entries {
        registry.register_generator(Arc::new(CatalogGenerator { type_tag, produce }));
    }
    registry.register_generator(Arc::new(BlankGenerator));
}

struct CatalogGenerator {
    type_tag: &'static str,
    produce: Produce,
}

impl Generator for CatalogGenerator {
    fn type_tag(&self) -> &str {
        self.type_tag
    }

    fn generate(&self, seed: u64) -> Result<CellValue, GeneratorError> {
        (self.produce)(&mut seeded_rng(seed))
    }
}

/// Suppresses any value to the empty string.
struct BlankGenerator;

impl Generator for BlankGenerator {
    fn type_tag(&self) -> &str {
        BLANK_TYPE
    }

    fn generate(&self, _seed: u64) -> Result<CellValue, GeneratorError> {
        Ok(CellValue::Text(String::new()))
    }

    fn is_constant(&self) -> bool {
        true
    }
}

fn company(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(CompanyName().fake_with_rng(rng)))
}

fn first_name(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(FirstName().fake_with_rng(rng)))
}

fn last_name(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(LastName().fake_with_rng(rng)))
}

fn full_name(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(Name().fake_with_rng(rng)))
}

fn email(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(SafeEmail().fake_with_rng(rng)))
}

fn phone(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(PhoneNumber().fake_with_rng(rng)))
}

fn address(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    Ok(CellValue::Text(format!("{number} {street}")))
}

fn city(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(CityName().fake_with_rng(rng)))
}

fn state(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(StateAbbr().fake_with_rng(rng)))
}

fn postal_code(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(ZipCode().fake_with_rng(rng)))
}

fn country(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    Ok(CellValue::Text(CountryName().fake_with_rng(rng)))
}

/// Four significant digits with two decimals: 10.00 to 99.99.
fn float(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    let digits: u32 = rng.random_range(1000..=9999);
    Ok(CellValue::Float(f64::from(digits) / 100.0))
}

fn date(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    let offset = rng.random_range(0..=DATE_SPAN_DAYS);
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_days(Days::new(offset)))
        .map(CellValue::Date)
        .ok_or_else(|| GeneratorError::new(format!("date offset {offset} out of range")))
}

/// Two uppercase letters followed by six digits, e.g. `HQ336336`.
fn check(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    let mut value = String::with_capacity(8);
    for _ in 0..2 {
        let index = rng.random_range(0..CHECK_LETTERS.len());
        value.push(char::from(CHECK_LETTERS[index]));
    }
    for _ in 0..6 {
        let digit: u8 = rng.random_range(0..=9);
        value.push(char::from(b'0' + digit));
    }
    Ok(CellValue::Text(value))
}

fn gender(rng: &mut ChaCha8Rng) -> Result<CellValue, GeneratorError> {
    let value = if rng.random_bool(0.5) { "M" } else { "F" };
    Ok(CellValue::text(value))
}
