//! Attendance screen: the signed-in user's meals for one day.

use super::{ScreenMessage, ScreenScope};
use crate::{
    auth::AuthUser,
    core::MessRepository,
    models::{Attendance, MealType, now_millis},
};
use chrono::NaiveDate;

/// The signed-in user's marks for one day.
#[derive(Debug)]
pub struct AttendanceScreen {
    mess: MessRepository,
    scope: ScreenScope,
    user: AuthUser,
    /// Day shown
    pub date: NaiveDate,
    records: Vec<Attendance>,
    message: Option<ScreenMessage>,
}

impl AttendanceScreen {
    /// An empty screen for `user` on `date`; call [`Self::load`] next.
    #[must_use]
    pub fn new(mess: MessRepository, user: AuthUser, date: NaiveDate) -> Self {
        Self {
            mess,
            scope: ScreenScope::new(),
            user,
            date,
            records: Vec::new(),
            message: None,
        }
    }

    /// Mount scope of this screen.
    #[must_use]
    pub const fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Inline message from the last operation.
    #[must_use]
    pub const fn message(&self) -> Option<&ScreenMessage> {
        self.message.as_ref()
    }

    /// Loaded records.
    #[must_use]
    pub fn records(&self) -> &[Attendance] {
        &self.records
    }

    /// Record for `meal`, if it was marked.
    #[must_use]
    pub fn record_for(&self, meal: MealType) -> Option<&Attendance> {
        self.records.iter().find(|r| r.meal_type == meal)
    }

    /// Present/absent per meal in serving order; `None` means not marked yet.
    #[must_use]
    pub fn summary(&self) -> [(MealType, Option<bool>); 3] {
        MealType::ALL.map(|meal| (meal, self.record_for(meal).map(|r| r.is_present)))
    }

    /// Reloads the day's records. Returns false on failure.
    pub async fn load(&mut self) -> bool {
        let mess = self.mess.clone();
        let user_id = self.user.uid.clone();
        let date = self.date;
        let Some(outcome) = self
            .scope
            .run(async move { mess.get_attendance(&user_id, date).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(records) => {
                self.records = records;
                self.message = None;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }

    /// Marks a meal present or absent, overwriting any earlier mark.
    pub async fn mark(&mut self, meal: MealType, is_present: bool) -> bool {
        let attendance =
            Attendance::new(&self.user.uid, &self.user.email, self.date, meal, is_present);
        let mess = self.mess.clone();
        let stored = attendance.clone();
        let Some(outcome) = self
            .scope
            .run(async move { mess.mark_attendance(attendance).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(_) => {
                self.records.retain(|r| r.meal_type != meal);
                self.records.push(stored);
                self.message = None;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }

    /// Flips an existing mark, or marks the meal present when there is none.
    pub async fn toggle(&mut self, meal: MealType) -> bool {
        let Some(existing) = self.record_for(meal).cloned() else {
            return self.mark(meal, true).await;
        };

        let mess = self.mess.clone();
        let id = existing.id.clone();
        let is_present = !existing.is_present;
        let Some(outcome) = self
            .scope
            .run(async move { mess.update_attendance(&id, is_present).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(_) => {
                if let Some(record) = self.records.iter_mut().find(|r| r.meal_type == meal) {
                    record.is_present = is_present;
                    record.timestamp = now_millis();
                }
                self.message = None;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Result, test_utils::*};

    #[tokio::test]
    async fn test_mark_and_toggle() -> Result<()> {
        let app = setup_test_app().await?;
        let user = app.sign_up("student@uni.edu").await?;
        let mut screen = AttendanceScreen::new(app.mess.clone(), user.clone(), test_date());

        assert!(screen.load().await);
        assert_eq!(screen.summary()[1], (MealType::Lunch, None));

        // No record yet, so toggle marks present
        assert!(screen.toggle(MealType::Lunch).await);
        assert_eq!(screen.record_for(MealType::Lunch).map(|r| r.is_present), Some(true));

        assert!(screen.toggle(MealType::Lunch).await);
        assert!(screen.mark(MealType::Dinner, true).await);

        // A fresh screen sees what was stored
        let mut reloaded = AttendanceScreen::new(app.mess.clone(), user, test_date());
        assert!(reloaded.load().await);
        assert_eq!(
            reloaded.summary(),
            [
                (MealType::Breakfast, None),
                (MealType::Lunch, Some(false)),
                (MealType::Dinner, Some(true)),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_record_toggle_reports_error() -> Result<()> {
        let app = setup_test_app().await?;
        let user = app.sign_up("student@uni.edu").await?;
        let mut screen = AttendanceScreen::new(app.mess.clone(), user, test_date());
        assert!(screen.mark(MealType::Lunch, true).await);

        // Point the local copy at a record the store does not have
        screen.records[0].id = "ghost".to_string();
        assert!(!screen.toggle(MealType::Lunch).await);
        assert!(screen.message().is_some_and(ScreenMessage::is_error));
        Ok(())
    }
}
