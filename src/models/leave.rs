// src/models/leave.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::views::ViewRecord;

pub const MIN_VACATION_DAYS: i32 = 5;
pub const MAX_VACATION_DAYS: i32 = 30;
pub const MAX_DAY_OFF_DAYS: i32 = 30;

// Férias não podem terminar no último trimestre (fechamento do ano)
const BLOCKED_VACATION_END_MONTHS: [u32; 3] = [10, 11, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "leave_kind")]
pub enum LeaveKind {
    Folga,
    Ferias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pendente,
    Aprovado,
    Rejeitado,
    Arquivado,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pendente => "Pendente",
            RequestStatus::Aprovado => "Aprovado",
            RequestStatus::Rejeitado => "Rejeitado",
            RequestStatus::Arquivado => "Arquivado",
        }
    }
}

/// Quem está agindo sobre a solicitação.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub is_owner: bool,
    pub is_coordinator: bool,
}

/// Dono só mexe enquanto pendente; coordenador decide a qualquer momento antes do arquivo.
pub fn can_transition(from: RequestStatus, to: RequestStatus, actor: Actor) -> bool {
    use RequestStatus::*;
    match (from, to) {
        (Pendente | Aprovado | Rejeitado, Aprovado | Rejeitado) if from != to => actor.is_coordinator,
        (Aprovado | Rejeitado, Arquivado) => actor.is_coordinator,
        (Arquivado, Aprovado | Rejeitado) => actor.is_coordinator,
        _ => false,
    }
}

/// Edição ou exclusão pelo dono enquanto a solicitação está pendente.
pub fn can_edit(status: RequestStatus, actor: Actor) -> bool {
    (actor.is_owner && status == RequestStatus::Pendente) || actor.is_coordinator
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestEntry {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub viewed_by: Vec<ViewRecord>,
}

/// Corpo de criação e edição. `endDate` vale para folga, `days` para férias.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestFields {
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub days: Option<i32>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTransitionPayload {
    pub status: RequestStatus,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Período já resolvido: datas finais e quantidade de dias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
}

/// Término das férias: o primeiro dia conta como dia de férias.
pub fn vacation_end_date(start: NaiveDate, days: i32) -> Result<NaiveDate, AppError> {
    start
        .checked_add_signed(Duration::days(i64::from(days) - 1))
        .ok_or(AppError::InvalidDateRange)
}

/// Valida e resolve o período conforme o tipo de solicitação.
pub fn resolve_period(
    kind: LeaveKind,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    days: Option<i32>,
) -> Result<LeavePeriod, AppError> {
    match kind {
        LeaveKind::Folga => {
            let end_date = end_date.unwrap_or(start_date);
            let days = (end_date - start_date).num_days() + 1;
            if !(1..=i64::from(MAX_DAY_OFF_DAYS)).contains(&days) {
                return Err(AppError::InvalidDateRange);
            }
            let days = days as i32;
            Ok(LeavePeriod { start_date, end_date, days })
        }
        LeaveKind::Ferias => {
            let days = days.unwrap_or(MAX_VACATION_DAYS);
            if !(MIN_VACATION_DAYS..=MAX_VACATION_DAYS).contains(&days) {
                return Err(AppError::InvalidDateRange);
            }
            let end_date = vacation_end_date(start_date, days)?;
            if BLOCKED_VACATION_END_MONTHS.contains(&end_date.month()) {
                return Err(AppError::VacationInBlockedMonth(end_date));
            }
            Ok(LeavePeriod { start_date, end_date, days })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const OWNER: Actor = Actor { is_owner: true, is_coordinator: false };
    const COORDINATOR: Actor = Actor { is_owner: false, is_coordinator: true };

    #[test]
    fn vacation_ending_in_october_is_rejected() {
        let err = resolve_period(LeaveKind::Ferias, date(2026, 9, 20), None, Some(30)).unwrap_err();
        assert!(matches!(err, AppError::VacationInBlockedMonth(end) if end == date(2026, 10, 19)));
    }

    #[test]
    fn vacation_ending_in_december_is_rejected_even_if_short() {
        let err = resolve_period(LeaveKind::Ferias, date(2026, 12, 1), None, Some(10)).unwrap_err();
        assert!(matches!(err, AppError::VacationInBlockedMonth(_)));
    }

    #[test]
    fn vacation_ending_in_september_is_accepted() {
        let period = resolve_period(LeaveKind::Ferias, date(2026, 9, 1), None, Some(30)).unwrap();
        assert_eq!(period.end_date, date(2026, 9, 30));
        assert_eq!(period.days, 30);
    }

    #[test]
    fn vacation_starting_in_december_ending_in_january_is_accepted() {
        let period = resolve_period(LeaveKind::Ferias, date(2026, 12, 20), None, Some(15)).unwrap();
        assert_eq!(period.end_date, date(2027, 1, 3));
    }

    #[test]
    fn vacation_days_outside_limits_are_rejected() {
        assert!(resolve_period(LeaveKind::Ferias, date(2026, 3, 1), None, Some(45)).is_err());
        assert!(resolve_period(LeaveKind::Ferias, date(2026, 3, 1), None, Some(2)).is_err());
    }

    #[test]
    fn day_off_counts_inclusive_days_and_rejects_inverted_range() {
        let period = resolve_period(LeaveKind::Folga, date(2026, 5, 4), Some(date(2026, 5, 5)), None).unwrap();
        assert_eq!(period.days, 2);
        assert!(matches!(
            resolve_period(LeaveKind::Folga, date(2026, 5, 5), Some(date(2026, 5, 4)), None),
            Err(AppError::InvalidDateRange)
        ));
    }

    #[test]
    fn day_off_longer_than_a_month_is_rejected() {
        let period = resolve_period(LeaveKind::Folga, date(2026, 5, 1), Some(date(2026, 5, 30)), None).unwrap();
        assert_eq!(period.days, MAX_DAY_OFF_DAYS);
        assert!(matches!(
            resolve_period(LeaveKind::Folga, date(2026, 5, 1), Some(date(2026, 5, 31)), None),
            Err(AppError::InvalidDateRange)
        ));
        assert!(matches!(
            resolve_period(LeaveKind::Folga, NaiveDate::MIN, Some(NaiveDate::MAX), None),
            Err(AppError::InvalidDateRange)
        ));
    }

    #[test]
    fn vacation_past_the_last_representable_date_is_rejected() {
        assert!(matches!(vacation_end_date(NaiveDate::MAX, 10), Err(AppError::InvalidDateRange)));
        assert!(matches!(
            resolve_period(LeaveKind::Ferias, NaiveDate::MAX, None, Some(MIN_VACATION_DAYS)),
            Err(AppError::InvalidDateRange)
        ));
    }

    #[test]
    fn only_coordinators_review_requests() {
        assert!(can_transition(RequestStatus::Pendente, RequestStatus::Aprovado, COORDINATOR));
        assert!(!can_transition(RequestStatus::Pendente, RequestStatus::Aprovado, OWNER));
        assert!(can_transition(RequestStatus::Aprovado, RequestStatus::Rejeitado, COORDINATOR));
    }

    #[test]
    fn pending_requests_cannot_be_archived_directly() {
        assert!(!can_transition(RequestStatus::Pendente, RequestStatus::Arquivado, COORDINATOR));
        assert!(can_transition(RequestStatus::Rejeitado, RequestStatus::Arquivado, COORDINATOR));
    }

    #[test]
    fn owner_edits_only_while_pending() {
        assert!(can_edit(RequestStatus::Pendente, OWNER));
        assert!(!can_edit(RequestStatus::Aprovado, OWNER));
        assert!(can_edit(RequestStatus::Aprovado, COORDINATOR));
    }
}
