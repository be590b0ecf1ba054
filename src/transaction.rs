//! Transaction model and record validation.

use crate::amount::Amount;
use crate::config::ValidationLimits;
use crate::error::RecordError;
use csv::StringRecord;
use serde::Serialize;
use std::str::FromStr;

/// Number of fields every input line must carry.
pub const SCHEMA_FIELDS: usize = 16;

/// Positions of the consumed columns within a record.
mod column {
    pub const ID: usize = 0;
    pub const SENDER: usize = 2;
    pub const RECEIVER: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const CATEGORY: usize = 5;
    pub const LOCATION: usize = 7;
    pub const FRAUD: usize = 9;
    pub const CHANNEL: usize = 15;
}

/// A validated, immutable financial transaction.
///
/// Only [`Transaction::from_record`] (and `new`, for callers that have already
/// validated their data) construct one; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: String,
    sender: String,
    receiver: String,
    amount: Amount,
    category: String,
    location: String,
    channel: String,
    is_fraud: bool,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
        location: impl Into<String>,
        channel: impl Into<String>,
        is_fraud: bool,
    ) -> Self {
        Transaction {
            id: id.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            category: category.into(),
            location: location.into(),
            channel: channel.into(),
            is_fraud,
        }
    }

    /// Validates a raw CSV record and converts it into a transaction.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// field count, field lengths, amount parse, amount range, required
    /// fields, then sender/receiver distinctness.
    pub fn from_record(
        record: &StringRecord,
        limits: &ValidationLimits,
    ) -> std::result::Result<Self, RecordError> {
        if record.len() < SCHEMA_FIELDS {
            return Err(RecordError::Malformed {
                expected: SCHEMA_FIELDS,
                found: record.len(),
            });
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let id = field(column::ID);
        let sender = field(column::SENDER);
        let receiver = field(column::RECEIVER);
        let category = field(column::CATEGORY);
        let location = field(column::LOCATION);
        let channel = field(column::CHANNEL);

        check_len("id", id, limits.max_id_len)?;
        check_len("sender", sender, limits.max_account_len)?;
        check_len("receiver", receiver, limits.max_account_len)?;
        check_len("category", category, limits.max_category_len)?;
        check_len("location", location, limits.max_location_len)?;
        check_len("channel", channel, limits.max_channel_len)?;

        let raw_amount = field(column::AMOUNT);
        let amount = match Amount::from_str(raw_amount) {
            Ok(amount) => amount,
            // Numeric text too large for a decimal is a range failure, not a parse failure.
            Err(_) if raw_amount.parse::<f64>().map_or(false, f64::is_finite) => {
                return Err(RecordError::AmountOutOfRange(raw_amount.to_string()));
            }
            Err(_) => return Err(RecordError::Parse(raw_amount.to_string())),
        };
        if !amount.is_positive() || amount > limits.max_amount {
            return Err(RecordError::AmountOutOfRange(raw_amount.to_string()));
        }

        for (name, value) in [
            ("id", id),
            ("sender", sender),
            ("receiver", receiver),
            ("category", category),
            ("location", location),
            ("channel", channel),
        ] {
            if value.is_empty() {
                return Err(RecordError::MissingField(name));
            }
        }

        if sender == receiver {
            return Err(RecordError::SelfTransfer(sender.to_string()));
        }

        Ok(Transaction::new(
            id,
            sender,
            receiver,
            amount,
            category,
            location,
            channel,
            parse_fraud_flag(field(column::FRAUD)),
        ))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The transaction type, used as the search key.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The payment channel, used as the grouping key.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_fraud(&self) -> bool {
        self.is_fraud
    }

    /// Label used in the grouped report.
    pub fn fraud_label(&self) -> &'static str {
        if self.is_fraud {
            "Fraud"
        } else {
            "Not Fraud"
        }
    }

    /// Structured form handed to the export layer.
    pub fn to_export(&self) -> ExportRecord<'_> {
        ExportRecord {
            id: &self.id,
            sender: &self.sender,
            receiver: &self.receiver,
            amount: self.amount,
            category: &self.category,
            location: &self.location,
            channel: &self.channel,
            is_fraud: self.is_fraud,
        }
    }
}

/// Serializable view of a [`Transaction`].
#[derive(Debug, Serialize)]
pub struct ExportRecord<'a> {
    pub id: &'a str,
    pub sender: &'a str,
    pub receiver: &'a str,
    pub amount: Amount,
    pub category: &'a str,
    pub location: &'a str,
    pub channel: &'a str,
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,
}

/// `"1"` and any casing of `"true"` are fraud; everything else is not.
pub fn parse_fraud_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

/// Distinct categories in first-seen order.
pub fn distinct_categories(transactions: &[Transaction]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for tx in transactions {
        if !seen.contains(&tx.category()) {
            seen.push(tx.category());
        }
    }
    seen
}

fn check_len(field: &'static str, value: &str, max: usize) -> std::result::Result<(), RecordError> {
    let len = value.chars().count();
    if len > max {
        return Err(RecordError::FieldTooLong { field, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    /// A valid 16-field row with selected columns overridden.
    fn row(overrides: &[(usize, &str)]) -> StringRecord {
        let mut fields = vec![
            "T1", "2023-08-01", "ACC1", "ACC2", "150.25", "transfer", "", "Lagos", "dev1", "0",
            "", "", "", "", "", "online",
        ];
        for &(idx, value) in overrides {
            fields[idx] = value;
        }
        record(&fields)
    }

    fn parse(rec: &StringRecord) -> std::result::Result<Transaction, RecordError> {
        Transaction::from_record(rec, &ValidationLimits::default())
    }

    #[test]
    fn test_parse_valid_record() {
        let tx = parse(&row(&[])).unwrap();
        assert_eq!(tx.id(), "T1");
        assert_eq!(tx.sender(), "ACC1");
        assert_eq!(tx.receiver(), "ACC2");
        assert_eq!(tx.amount().to_string(), "150.25");
        assert_eq!(tx.category(), "transfer");
        assert_eq!(tx.location(), "Lagos");
        assert_eq!(tx.channel(), "online");
        assert!(!tx.is_fraud());
        assert_eq!(tx.fraud_label(), "Not Fraud");
    }

    #[test]
    fn test_rejects_short_record() {
        let rec = record(&["T1", "x", "A", "B", "10"]);
        assert_eq!(
            parse(&rec),
            Err(RecordError::Malformed {
                expected: 16,
                found: 5
            })
        );
    }

    #[test]
    fn test_rejects_long_fields() {
        let long_id = "x".repeat(51);
        let err = parse(&row(&[(0, long_id.as_str())])).unwrap_err();
        assert!(matches!(err, RecordError::FieldTooLong { field: "id", .. }));

        let long_channel = "c".repeat(31);
        let err = parse(&row(&[(15, long_channel.as_str())])).unwrap_err();
        assert!(matches!(err, RecordError::FieldTooLong { field: "channel", .. }));
    }

    #[test]
    fn test_length_check_precedes_amount_parse() {
        let long_category = "c".repeat(21);
        let err = parse(&row(&[(5, long_category.as_str()), (4, "abc")])).unwrap_err();
        assert!(matches!(err, RecordError::FieldTooLong { field: "category", .. }));
    }

    #[test]
    fn test_rejects_unparseable_amount() {
        let err = parse(&row(&[(4, "abc")])).unwrap_err();
        assert_eq!(err, RecordError::Parse("abc".to_string()));
        assert_eq!(err.kind(), crate::error::SkipKind::Parse);

        let err = parse(&row(&[(4, "1_000")])).unwrap_err();
        assert_eq!(err, RecordError::Parse("1_000".to_string()));
    }

    #[test]
    fn test_huge_amount_is_out_of_range() {
        let err = parse(&row(&[(4, "1e30")])).unwrap_err();
        assert_eq!(err, RecordError::AmountOutOfRange("1e30".to_string()));
        assert_eq!(err.kind(), crate::error::SkipKind::Validation);

        let err = parse(&row(&[(4, "inf")])).unwrap_err();
        assert_eq!(err.kind(), crate::error::SkipKind::Parse);
    }

    #[test]
    fn test_amount_bounds() {
        assert!(matches!(
            parse(&row(&[(4, "0")])),
            Err(RecordError::AmountOutOfRange(_))
        ));
        assert!(matches!(
            parse(&row(&[(4, "-3")])),
            Err(RecordError::AmountOutOfRange(_))
        ));
        assert!(matches!(
            parse(&row(&[(4, "1000000.01")])),
            Err(RecordError::AmountOutOfRange(_))
        ));
        assert!(parse(&row(&[(4, "1000000")])).is_ok());
    }

    #[test]
    fn test_custom_amount_limit() {
        let limits = ValidationLimits {
            max_amount: Amount::from_units(100),
            ..ValidationLimits::default()
        };
        let err = Transaction::from_record(&row(&[]), &limits).unwrap_err();
        assert!(matches!(err, RecordError::AmountOutOfRange(_)));
    }

    #[test]
    fn test_rejects_empty_required_field() {
        assert_eq!(
            parse(&row(&[(7, "")])),
            Err(RecordError::MissingField("location"))
        );
    }

    #[test]
    fn test_rejects_self_transfer() {
        let err = parse(&row(&[(3, "ACC1")])).unwrap_err();
        assert_eq!(err, RecordError::SelfTransfer("ACC1".to_string()));
        assert_eq!(err.kind(), crate::error::SkipKind::Validation);
    }

    #[test]
    fn test_fraud_flag() {
        assert!(parse_fraud_flag("1"));
        assert!(parse_fraud_flag("true"));
        assert!(parse_fraud_flag("TRUE"));
        assert!(parse_fraud_flag("True"));
        assert!(!parse_fraud_flag("0"));
        assert!(!parse_fraud_flag("yes"));
        assert!(!parse_fraud_flag(""));

        let tx = parse(&row(&[(9, "True")])).unwrap();
        assert_eq!(tx.fraud_label(), "Fraud");
    }

    #[test]
    fn test_distinct_categories_first_seen_order() {
        let txs: Vec<Transaction> = ["deposit", "transfer", "deposit", "withdrawal"]
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                Transaction::new(
                    format!("T{}", i),
                    "A",
                    "B",
                    Amount::from_units(1),
                    *cat,
                    "L",
                    "online",
                    false,
                )
            })
            .collect();
        assert_eq!(
            distinct_categories(&txs),
            vec!["deposit", "transfer", "withdrawal"]
        );
    }

    #[test]
    fn test_export_record_shape() {
        let tx = parse(&row(&[(9, "1")])).unwrap();
        let json = serde_json::to_value(tx.to_export()).unwrap();
        assert_eq!(json["id"], "T1");
        assert_eq!(json["channel"], "online");
        assert_eq!(json["isFraud"], true);
        assert_eq!(json["amount"], 150.25);
    }
}
