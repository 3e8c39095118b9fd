//! Command structs for engine operations.
//!
//! These types group parameters for write operations (new items, new bills,
//! partial updates), keeping call sites readable and avoiding long argument
//! lists.

use uuid::Uuid;

use crate::{MoneyCents, MonthYear};

/// Add an item to an open session.
#[derive(Clone, Debug)]
pub struct NewItem {
    pub session_id: Uuid,
    pub name: String,
    pub price: MoneyCents,
    /// Values below 1 are stored as 1.
    pub quantity: i32,
    pub is_personal: bool,
}

impl NewItem {
    #[must_use]
    pub fn new(session_id: Uuid, name: impl Into<String>, price: MoneyCents) -> Self {
        Self {
            session_id,
            name: name.into(),
            price,
            quantity: 1,
            is_personal: false,
        }
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn personal(mut self, is_personal: bool) -> Self {
        self.is_personal = is_personal;
        self
    }
}

/// Create a fixed bill.
///
/// `due_day` defaults to 10, `split_count` to 2 and `month_year` to the
/// current month.
#[derive(Clone, Debug)]
pub struct NewBill {
    pub title: String,
    pub amount: MoneyCents,
    pub due_day: Option<i32>,
    pub split_count: Option<i32>,
    pub month_year: Option<MonthYear>,
    pub is_paid: bool,
}

impl NewBill {
    #[must_use]
    pub fn new(title: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            title: title.into(),
            amount,
            due_day: None,
            split_count: None,
            month_year: None,
            is_paid: false,
        }
    }

    #[must_use]
    pub fn due_day(mut self, due_day: i32) -> Self {
        self.due_day = Some(due_day);
        self
    }

    #[must_use]
    pub fn split_count(mut self, split_count: i32) -> Self {
        self.split_count = Some(split_count);
        self
    }

    #[must_use]
    pub fn month_year(mut self, month_year: MonthYear) -> Self {
        self.month_year = Some(month_year);
        self
    }

    #[must_use]
    pub fn paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }
}

/// Partial update of a session. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub split_count: Option<i32>,
    pub is_finalized: Option<bool>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.split_count.is_none() && self.is_finalized.is_none()
    }
}

/// Partial update of a bill. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct BillPatch {
    pub title: Option<String>,
    pub amount: Option<MoneyCents>,
    pub due_day: Option<i32>,
    pub split_count: Option<i32>,
    pub month_year: Option<MonthYear>,
    pub is_paid: Option<bool>,
}

impl BillPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.due_day.is_none()
            && self.split_count.is_none()
            && self.month_year.is_none()
            && self.is_paid.is_none()
    }
}
