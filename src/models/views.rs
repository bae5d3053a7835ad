// src/models/views.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::common::error::AppError;

/// Fração mínima do cartão visível para contar como "visualizado".
pub const MIN_VISIBLE_RATIO: f64 = 0.6;

/// Visualização só conta com o cartão suficientemente visível na tela.
/// Sem a fração informada, a abertura explícita do detalhe vale como visualização.
pub fn check_visible_ratio(ratio: Option<f64>) -> Result<(), AppError> {
    match ratio {
        Some(r) if !(MIN_VISIBLE_RATIO..=1.0).contains(&r) => {
            let mut err = ValidationError::new("range");
            err.add_param("min".into(), &MIN_VISIBLE_RATIO);
            err.message = Some("O cartão precisa estar ao menos 60% visível.".into());
            let mut errors = ValidationErrors::new();
            errors.add("visibleRatio", err);
            Err(AppError::ValidationError(errors))
        }
        _ => Ok(()),
    }
}

/// Corpo do registro de visualização enviado pelo frontend.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewPayload {
    #[schema(example = 0.75)]
    pub visible_ratio: Option<f64>,
}

/// Entidades que registram quem já visualizou o quê.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTarget {
    Task,
    ShiftChange,
    LeaveRequest,
}

impl ViewTarget {
    // Nomes fixos: nunca vêm da requisição
    pub(crate) fn table(self) -> &'static str {
        match self {
            ViewTarget::Task => "task_views",
            ViewTarget::ShiftChange => "shift_change_views",
            ViewTarget::LeaveRequest => "leave_request_views",
        }
    }

    pub(crate) fn key_column(self) -> &'static str {
        match self {
            ViewTarget::Task => "task_id",
            ViewTarget::ShiftChange => "shift_change_id",
            ViewTarget::LeaveRequest => "leave_request_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub user_id: Uuid,
    #[schema(example = "Maria Souza")]
    pub user_name: String,
    pub viewed_at: DateTime<Utc>,
}

/// Conjunto "visto por": no máximo uma entrada por usuário, sempre a mais recente.
#[derive(Debug, Clone, Default)]
pub struct ViewSet {
    by_user: HashMap<Uuid, ViewRecord>,
}

impl ViewSet {
    pub fn record(&mut self, view: ViewRecord) {
        match self.by_user.get(&view.user_id) {
            Some(current) if current.viewed_at >= view.viewed_at => {}
            _ => {
                self.by_user.insert(view.user_id, view);
            }
        }
    }

    /// Reconcilia o estado otimista com o que veio do banco.
    /// Usuários de ambos os lados são mantidos; por usuário vence o horário mais recente.
    pub fn merge(mut self, authoritative: impl IntoIterator<Item = ViewRecord>) -> Self {
        for view in authoritative {
            self.record(view);
        }
        self
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    /// Visualizações da mais recente para a mais antiga.
    pub fn into_sorted(self) -> Vec<ViewRecord> {
        let mut views: Vec<_> = self.by_user.into_values().collect();
        views.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
        views
    }
}

/// Junta a visualização recém-gravada às já registradas. O horário de `own`
/// é o devolvido pelo banco, nunca o relógio da aplicação.
pub fn reconcile_views(own: ViewRecord, stored: Vec<ViewRecord>) -> Vec<ViewRecord> {
    std::iter::once(own).chain(stored).collect::<ViewSet>().into_sorted()
}

impl FromIterator<ViewRecord> for ViewSet {
    fn from_iter<I: IntoIterator<Item = ViewRecord>>(iter: I) -> Self {
        ViewSet::default().merge(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn view(user_id: Uuid, at: DateTime<Utc>) -> ViewRecord {
        ViewRecord { user_id, user_name: "Fulano".into(), viewed_at: at }
    }

    #[test]
    fn visible_ratio_below_threshold_is_rejected() {
        assert!(check_visible_ratio(Some(0.59)).is_err());
        assert!(check_visible_ratio(Some(1.5)).is_err());
        assert!(check_visible_ratio(Some(0.6)).is_ok());
        assert!(check_visible_ratio(None).is_ok());
    }

    #[test]
    fn two_views_by_the_same_user_keep_only_the_latest() {
        let user = Uuid::new_v4();
        let earlier = Utc::now() - Duration::minutes(10);
        let later = Utc::now();

        let mut set = ViewSet::default();
        set.record(view(user, earlier));
        set.record(view(user, later));

        let views = set.into_sorted();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].viewed_at, later);
    }

    #[test]
    fn reconciled_views_carry_only_persisted_timestamps() {
        let (me, colleague) = (Uuid::new_v4(), Uuid::new_v4());
        let persisted = Utc::now() - Duration::minutes(3);
        let stored = vec![view(me, persisted), view(colleague, persisted - Duration::hours(2))];

        let views = reconcile_views(view(me, persisted), stored.clone());

        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| stored.contains(v)));
    }

    #[test]
    fn older_view_does_not_overwrite_newer_one() {
        let user = Uuid::new_v4();
        let later = Utc::now();
        let set: ViewSet = vec![view(user, later), view(user, later - Duration::hours(1))]
            .into_iter()
            .collect();
        assert_eq!(set.into_sorted()[0].viewed_at, later);
    }

    #[test]
    fn merge_keeps_users_from_both_sides() {
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();

        let optimistic: ViewSet = vec![view(me, now)].into_iter().collect();
        let merged = optimistic.merge(vec![
            view(me, now - Duration::seconds(5)),
            view(other, now - Duration::minutes(3)),
        ]);

        assert_eq!(merged.len(), 2);
        assert!(merged.contains(other));
        let views = merged.into_sorted();
        assert_eq!(views[0].user_id, me);
        assert_eq!(views[0].viewed_at, now);
    }
}
