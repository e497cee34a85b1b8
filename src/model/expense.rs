use crate::model::{Amount, AmountError, Category};
use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The wire format of an expense date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The identifier the remote service assigns to an expense when it is created.
///
/// Services may use either JSON strings or JSON numbers for ids. The id remembers which form it
/// arrived in so it can be written back the same way, but two ids are equal whenever their text is
/// equal: `1` and `"1"` name the same record.
#[derive(Debug, Clone)]
pub struct ExpenseId {
    value: String,
    numeric: bool,
}

impl ExpenseId {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let numeric = !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
        Self { value, numeric }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<u64> for ExpenseId {
    fn from(value: u64) -> Self {
        Self {
            value: value.to_string(),
            numeric: true,
        }
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_string(),
            numeric: false,
        }
    }
}

impl PartialEq for ExpenseId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ExpenseId {}

impl Hash for ExpenseId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl PartialOrd for ExpenseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpenseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(&self.value)
    }
}

impl FromStr for ExpenseId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExpenseId::new(s.trim()))
    }
}

impl Serialize for ExpenseId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value.parse::<u64>() {
            Ok(n) if self.numeric => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.value),
        }
    }
}

impl<'de> Deserialize<'de> for ExpenseId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ExpenseIdVisitor)
    }
}

struct ExpenseIdVisitor;

impl<'de> Visitor<'de> for ExpenseIdVisitor {
    type Value = ExpenseId;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a non-negative integer id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ExpenseId, E> {
        Ok(ExpenseId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ExpenseId, E> {
        u64::try_from(v)
            .map(ExpenseId::from)
            .map_err(|_| E::custom(format!("negative id {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ExpenseId, E> {
        if v.is_empty() {
            return Err(E::custom("empty id"));
        }
        Ok(ExpenseId::from(v))
    }
}

/// An expense record that the remote service has created, and therefore has an id.
///
/// Wire shape: `{ id, amount, category, description, date? }`. A missing `category` or
/// `description` is tolerated; a missing, `null` or empty `date` means the record has no date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub(crate) id: ExpenseId,
    pub(crate) amount: Amount,
    #[serde(default)]
    pub(crate) category: Category,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(
        default,
        with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) date: Option<NaiveDate>,
}

impl Expense {
    /// Combines a service-assigned `id` with the fields of a `NewExpense`.
    pub fn from_new(id: ExpenseId, expense: NewExpense) -> Self {
        Self {
            id,
            amount: expense.amount,
            category: expense.category,
            description: expense.description,
            date: expense.date,
        }
    }

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns a copy of this expense with `updates` applied.
    pub fn with_updates(&self, updates: &ExpenseUpdates) -> Self {
        let mut updated = self.clone();
        if let Some(amount) = updates.amount {
            updated.amount = amount;
        }
        if let Some(category) = &updates.category {
            updated.category = category.clone();
        }
        if let Some(description) = &updates.description {
            updated.description = description.clone();
        }
        if let Some(date) = updates.date {
            updated.date = date;
        }
        updated
    }
}

/// An expense that has not been created yet. This is the body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    amount: Amount,
    category: Category,
    description: String,
    #[serde(with = "optional_date", skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl NewExpense {
    /// Creates a `NewExpense`, rejecting amounts that may not be persisted.
    pub fn new(
        amount: Amount,
        category: Category,
        description: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Result<Self, AmountError> {
        amount.ensure_persistable()?;
        Ok(Self {
            amount,
            category,
            description: description.into(),
            date,
        })
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// A partial update of an expense. This is the body of an update request; only the fields that
/// are `Some` are sent. For `date`, `Some(None)` clears the date and is sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date_update"
    )]
    pub date: Option<Option<NaiveDate>>,
}

impl ExpenseUpdates {
    /// True when no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }

    /// Checks that the update may be sent to the remote service.
    pub fn validate(&self) -> Result<(), AmountError> {
        match self.amount {
            Some(amount) => amount.ensure_persistable(),
            None => Ok(()),
        }
    }
}

fn serialize_date_update<S>(date: &Option<Option<NaiveDate>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(inner) => optional_date::serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

/// Serde helpers for `Option<NaiveDate>` in `YYYY-MM-DD` form, where an empty string also means
/// `None`.
pub(crate) mod optional_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid date '{s}': {e}"))),
        }
    }
}
