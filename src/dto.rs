use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money I owe to someone.
    Debt,
    /// Money someone owes me.
    Lent,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debt => "debt",
            TransactionType::Lent => "lent",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debt" => Ok(TransactionType::Debt),
            "lent" => Ok(TransactionType::Lent),
            _ => Err(Error::UnknownTransactionType(s.to_owned())),
        }
    }
}

/// A single owed/lent record, as held in memory and persisted in the blob.
///
/// Everything except `settled` is fixed at creation. The ledger only ever
/// hands out shared references, and settling replaces the record with an
/// updated copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub person_name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Validates user input and builds a new unsettled transaction with a
    /// fresh id and `created_at` set to now.
    pub fn new(
        tx_type: TransactionType,
        person_name: &str,
        amount: &str,
        description: &str,
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let person_name = person_name.trim();
        if person_name.is_empty() {
            return Err(Error::EmptyPersonName);
        }
        let amount = parse_amount(amount)?;

        Ok(Self {
            id: Ulid::new().to_string(),
            tx_type,
            person_name: person_name.to_owned(),
            amount,
            description: description.trim().to_owned(),
            date,
            settled: false,
            created_at: Utc::now(),
        })
    }

    /// Checks the invariants `new` guarantees, for records read back from
    /// storage: a non-blank name and an amount in `(0, MAX_AMOUNT]`.
    pub fn validate(&self) -> Result<()> {
        if self.person_name.trim().is_empty() {
            return Err(Error::EmptyPersonName);
        }
        check_amount(self.amount)
    }

    /// Returns a copy with the settled flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            settled: !self.settled,
            ..self.clone()
        }
    }
}

/// Largest amount a single transaction may carry, 10^15. Leaves room for
/// roughly 10^13 maximal records before a running total could leave
/// `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2764472320, 232830, 0, false, 0);

/// Parses a user-entered amount. Accepts plain decimals ("12.50") and
/// scientific notation ("1e3"), rounds toward zero to 4 decimal places and
/// rejects anything outside `(0, MAX_AMOUNT]` afterwards.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::InvalidAmount(raw.to_owned()))?
        .round_dp_with_strategy(4, RoundingStrategy::ToZero);
    check_amount(amount)?;
    Ok(amount)
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::AmountMustBePositive);
    }
    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge(MAX_AMOUNT));
    }
    Ok(())
}

/// Parses a transaction date given either as RFC 3339 or as a bare
/// `YYYY-MM-DD`, the latter taken as midnight UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
        .ok_or_else(|| Error::InvalidDate(raw.to_owned()))
}

/// Flat row used for CSV export.
#[derive(Debug, Serialize, PartialEq)]
pub struct TransactionRow {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub person: String,
    pub amount: Decimal,
    pub description: String,
    pub date: DateTime<Utc>,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            tx_type: transaction.tx_type,
            person: transaction.person_name.clone(),
            amount: transaction.amount,
            description: transaction.description.clone(),
            date: transaction.date,
            settled: transaction.settled,
            created_at: transaction.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn parse_json_record(record: &str) -> Result<Transaction, serde_json::Error> {
        serde_json::from_str(record)
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_debt_record() {
        let record = r#"{"id":"a1","type":"debt","personName":"Alice","amount":"500",
            "description":"lunch","date":"2024-01-01T00:00:00Z","settled":false,
            "createdAt":"2024-01-01T10:00:00Z"}"#;
        assert_eq!(
            parse_json_record(record).unwrap(),
            Transaction {
                id: "a1".to_owned(),
                tx_type: TransactionType::Debt,
                person_name: "Alice".to_owned(),
                amount: dec!(500),
                description: "lunch".to_owned(),
                date: utc(2024, 1, 1, 0),
                settled: false,
                created_at: utc(2024, 1, 1, 10),
            }
        );
    }

    #[test]
    fn test_parse_numeric_amount_and_millisecond_timestamps() {
        let record = r#"{"id":"1704067200000","type":"lent","personName":"Bob","amount":250.75,
            "description":"","date":"2024-01-02T00:00:00.000Z","settled":true,
            "createdAt":"2024-01-02T10:00:00.000Z"}"#;
        let transaction = parse_json_record(record).unwrap();
        assert_eq!(transaction.tx_type, TransactionType::Lent);
        assert_eq!(transaction.amount, dec!(250.75));
        assert_eq!(transaction.date, utc(2024, 1, 2, 0));
        assert!(transaction.settled);
    }

    #[test]
    fn test_parse_missing_optional_fields() {
        let record = r#"{"id":"a1","type":"lent","personName":"Bob","amount":"1",
            "date":"2024-01-02T00:00:00Z","createdAt":"2024-01-02T00:00:00Z"}"#;
        let transaction = parse_json_record(record).unwrap();
        assert_eq!(transaction.description, "");
        assert!(!transaction.settled);
    }

    #[test]
    fn test_parse_invalid_transaction_type() {
        let record = r#"{"id":"a1","type":"gift","personName":"Bob","amount":"1",
            "date":"2024-01-02T00:00:00Z","createdAt":"2024-01-02T00:00:00Z"}"#;
        assert!(parse_json_record(record).is_err());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let transaction = Transaction {
            id: "a1".to_owned(),
            tx_type: TransactionType::Debt,
            person_name: "Alice".to_owned(),
            amount: dec!(12.5),
            description: String::new(),
            date: utc(2024, 1, 1, 0),
            settled: false,
            created_at: utc(2024, 1, 1, 10),
        };
        let value = serde_json::to_value(&transaction).unwrap();
        assert_eq!(value["type"], "debt");
        assert_eq!(value["personName"], "Alice");
        assert_eq!(value["amount"], "12.5");
        assert_eq!(value["createdAt"], "2024-01-01T10:00:00Z");
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("debt".parse::<TransactionType>().unwrap(), TransactionType::Debt);
        assert_eq!(" Lent ".parse::<TransactionType>().unwrap(), TransactionType::Lent);
        assert!(matches!(
            "loan".parse::<TransactionType>(),
            Err(Error::UnknownTransactionType(_))
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500").unwrap(), dec!(500));
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec!(12.50));
        assert_eq!(parse_amount("1e3").unwrap(), dec!(1000));
    }

    #[test]
    fn test_parse_amount_rounds_to_4_decimal_places() {
        assert_eq!(parse_amount("0.12345").unwrap(), dec!(0.1234));
        assert_eq!(parse_amount("0.123499999").unwrap(), dec!(0.1234));
    }

    #[test]
    fn test_parse_amount_rejects_non_positive() {
        assert!(matches!(parse_amount("0"), Err(Error::AmountMustBePositive)));
        assert!(matches!(parse_amount("-5"), Err(Error::AmountMustBePositive)));
        // Rounds to zero
        assert!(matches!(parse_amount("0.00001"), Err(Error::AmountMustBePositive)));
    }

    #[test]
    fn test_parse_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000000));
        assert_eq!(parse_amount("1000000000000000").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            parse_amount("1000000000000000.0001"),
            Err(Error::AmountTooLarge(_))
        ));
        // Decimal::MAX parses but is far beyond any sane ledger entry
        assert!(matches!(
            parse_amount("79228162514264337593543950335"),
            Err(Error::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_loaded_record() {
        let record = r#"{"id":"a1","type":"debt","personName":"Alice","amount":"500",
            "date":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"}"#;
        let valid = parse_json_record(record).unwrap();
        assert!(valid.validate().is_ok());

        let mut blank_name = valid.clone();
        blank_name.person_name = "  ".to_owned();
        assert!(matches!(blank_name.validate(), Err(Error::EmptyPersonName)));

        let mut negative = valid.clone();
        negative.amount = dec!(-500);
        assert!(matches!(negative.validate(), Err(Error::AmountMustBePositive)));

        let mut zero = valid.clone();
        zero.amount = dec!(0);
        assert!(matches!(zero.validate(), Err(Error::AmountMustBePositive)));

        let mut huge = valid;
        huge.amount = rust_decimal::Decimal::MAX;
        assert!(matches!(huge.validate(), Err(Error::AmountTooLarge(_))));
    }

    #[test]
    fn test_parse_amount_rejects_non_numeric() {
        for raw in ["", "abc", "NaN", "inf", "12abc"] {
            assert!(
                matches!(parse_amount(raw), Err(Error::InvalidAmount(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-01").unwrap(), utc(2024, 1, 1, 0));
        assert_eq!(parse_date("2024-01-01T10:00:00Z").unwrap(), utc(2024, 1, 1, 10));
        assert_eq!(
            parse_date("2024-01-01T15:30:00+05:30").unwrap(),
            utc(2024, 1, 1, 10)
        );
        assert!(matches!(parse_date("01/01/2024"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_new_transaction_trims_and_validates() {
        let date = utc(2024, 1, 1, 0);
        let transaction =
            Transaction::new(TransactionType::Debt, "  Alice ", "500", " lunch ", date).unwrap();
        assert_eq!(transaction.person_name, "Alice");
        assert_eq!(transaction.description, "lunch");
        assert_eq!(transaction.amount, dec!(500));
        assert_eq!(transaction.date, date);
        assert!(!transaction.settled);
        assert!(!transaction.id.is_empty());

        assert!(matches!(
            Transaction::new(TransactionType::Debt, "   ", "500", "", date),
            Err(Error::EmptyPersonName)
        ));
        assert!(matches!(
            Transaction::new(TransactionType::Lent, "Bob", "0", "", date),
            Err(Error::AmountMustBePositive)
        ));
    }

    #[test]
    fn test_new_transactions_get_distinct_ids() {
        let date = utc(2024, 1, 1, 0);
        let first = Transaction::new(TransactionType::Debt, "Alice", "1", "", date).unwrap();
        let second = Transaction::new(TransactionType::Debt, "Alice", "1", "", date).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_toggled_flips_only_settled() {
        let date = utc(2024, 1, 1, 0);
        let original = Transaction::new(TransactionType::Lent, "Bob", "300", "", date).unwrap();
        let toggled = original.toggled();
        assert!(toggled.settled);
        assert_eq!(toggled.toggled(), original);
    }
}
