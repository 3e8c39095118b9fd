use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Bill, BillPatch, EngineError, MoneyCents, MonthYear, NewBill, ResultEngine, SplitCount,
    bills::{self, normalize_due_day},
    util::normalize_required_name,
};

use super::Engine;

fn check_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Bills of the user ordered by due day, optionally limited to one month.
    ///
    /// Rows that cannot be read (e.g. a garbled `month_year`) are logged and
    /// left out.
    pub async fn list_bills(
        &self,
        user_id: &str,
        month_year: Option<MonthYear>,
    ) -> ResultEngine<Vec<Bill>> {
        let mut query = bills::Entity::find()
            .filter(bills::Column::UserId.eq(user_id.to_string()));
        if let Some(month_year) = month_year {
            query = query.filter(bills::Column::MonthYear.eq(month_year.to_string()));
        }

        let models = query
            .order_by_asc(bills::Column::DueDay)
            .order_by_asc(bills::Column::CreatedAt)
            .all(&self.database)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                Bill::try_from(model)
                    .inspect_err(|err| tracing::warn!("skipping unreadable bill {id}: {err}"))
                    .ok()
            })
            .collect())
    }

    pub async fn create_bill(&self, user_id: &str, new_bill: NewBill) -> ResultEngine<Bill> {
        let title = normalize_required_name(&new_bill.title, "bill title")?;
        check_amount(new_bill.amount)?;

        let bill = Bill {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title,
            amount: new_bill.amount,
            due_day: normalize_due_day(new_bill.due_day),
            split_count: SplitCount::from_optional(new_bill.split_count),
            month_year: new_bill.month_year.unwrap_or_else(MonthYear::current),
            is_paid: new_bill.is_paid,
            created_at: Utc::now(),
        };
        bills::ActiveModel::from(&bill)
            .insert(&self.database)
            .await?;
        tracing::debug!("created bill {} for {}", bill.id, bill.month_year);
        Ok(bill)
    }

    /// Applies a partial update and returns the stored bill.
    pub async fn update_bill(
        &self,
        user_id: &str,
        bill_id: Uuid,
        patch: BillPatch,
    ) -> ResultEngine<Bill> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one field to update".to_string(),
            ));
        }
        self.require_bill(&self.database, bill_id, user_id)
            .await?;

        let mut active = bills::ActiveModel {
            id: ActiveValue::Set(bill_id.to_string()),
            ..Default::default()
        };
        if let Some(title) = patch.title.as_deref() {
            active.title = ActiveValue::Set(normalize_required_name(title, "bill title")?);
        }
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
            active.amount = ActiveValue::Set(Some(amount.cents()));
        }
        if let Some(due_day) = patch.due_day {
            active.due_day = ActiveValue::Set(Some(normalize_due_day(Some(due_day))));
        }
        if let Some(split_count) = patch.split_count {
            active.split_count = ActiveValue::Set(Some(SplitCount::new(split_count).get()));
        }
        if let Some(month_year) = patch.month_year {
            active.month_year = ActiveValue::Set(month_year.to_string());
        }
        if let Some(is_paid) = patch.is_paid {
            active.is_paid = ActiveValue::Set(Some(is_paid));
        }

        let model = active.update(&self.database).await?;
        Bill::try_from(model)
    }

    /// Toggles the paid flag (`Unpaid ⇄ Paid`).
    pub async fn set_bill_paid(
        &self,
        user_id: &str,
        bill_id: Uuid,
        is_paid: bool,
    ) -> ResultEngine<Bill> {
        self.update_bill(
            user_id,
            bill_id,
            BillPatch {
                is_paid: Some(is_paid),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_bill(&self, user_id: &str, bill_id: Uuid) -> ResultEngine<()> {
        let model = self
            .require_bill(&self.database, bill_id, user_id)
            .await?;
        model.delete(&self.database).await?;
        tracing::debug!("deleted bill {bill_id}");
        Ok(())
    }
}
