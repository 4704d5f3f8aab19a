//! The calendar administration screen without its widgets.
//!
//! [`CalendarManager`] owns the weekly schedule, the holidays and the vacation
//! periods, routes add/edit/delete actions to the right editor and collection,
//! and writes whole collections back to the [`CalendarStore`]. Holidays and
//! vacation periods share one stored collection, so saving either rewrites both.

use crate::class_session::WeeklySchedule;
use crate::editor::{
    ClassEditor, Draft, Editor, EditorError, EntityDraft, HolidayEditor, VacationEditor,
};
use crate::entity::{Entity, EntityKind, new_entity_id, remove_by_id, upsert_by_id};
use crate::holiday::{CalendarEntry, Holiday, VacationPeriod, combine_entries, partition_entries};
use crate::persistence::{CalendarStore, GroupDirectory, PersistenceError, group_names};
use crate::settings::Settings;
use crate::status::{Clock, ClearPolicy, StatusBoard, SystemClock};
use crate::validation::FieldErrors;
use crate::views::{ListAction, RowAction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Unable to load the school calendar.";
pub const SAVE_FAILED_MESSAGE: &str = "Unable to save your changes.";

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("could not load the calendar: {0}")]
    Load(#[source] PersistenceError),
    #[error("could not save the {kind} collection: {source}")]
    Save {
        kind: EntityKind,
        #[source]
        source: PersistenceError,
    },
    #[error("invalid fields: {0}")]
    Validation(FieldErrors),
    #[error("no {kind} with id '{id}'")]
    NotFound { kind: EntityKind, id: String },
    #[error("the {0} editor is not open")]
    EditorClosed(EntityKind),
}

pub struct CalendarManager<S, G> {
    store: S,
    groups: G,
    clock: Arc<dyn Clock>,
    schedule: WeeklySchedule,
    holidays: Vec<Holiday>,
    vacations: Vec<VacationPeriod>,
    class_editor: ClassEditor,
    holiday_editor: HolidayEditor,
    vacation_editor: VacationEditor,
    editing: Option<Entity>,
    group_options: Vec<String>,
    status: StatusBoard,
}

impl<T> CalendarManager<Arc<T>, Arc<T>>
where
    T: CalendarStore + GroupDirectory + ?Sized,
{
    /// Manager whose store also serves the student groups.
    pub fn with_shared_store(store: Arc<T>) -> Self {
        Self::new(store.clone(), store)
    }
}

impl<S: CalendarStore, G: GroupDirectory> CalendarManager<S, G> {
    pub fn new(store: S, groups: G) -> Self {
        Self {
            store,
            groups,
            clock: Arc::new(SystemClock),
            schedule: WeeklySchedule::new(),
            holidays: Vec::new(),
            vacations: Vec::new(),
            class_editor: Editor::new(),
            holiday_editor: Editor::new(),
            vacation_editor: Editor::new(),
            editing: None,
            group_options: Vec::new(),
            status: StatusBoard::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_message_policy(mut self, ttl: Duration, policy: ClearPolicy) -> Self {
        self.status = StatusBoard::new(ttl, policy);
        self
    }

    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_message_policy(settings.message_ttl(), settings.clear_policy)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn vacations(&self) -> &[VacationPeriod] {
        &self.vacations
    }

    pub fn combined_entries(&self) -> Vec<CalendarEntry> {
        combine_entries(&self.holidays, &self.vacations)
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// The entity the open editor was prefilled from; `None` while creating.
    pub fn editing(&self) -> Option<&Entity> {
        self.editing.as_ref()
    }

    pub fn group_options(&self) -> &[String] {
        &self.group_options
    }

    pub fn class_editor(&self) -> &ClassEditor {
        &self.class_editor
    }

    pub fn class_editor_mut(&mut self) -> &mut ClassEditor {
        &mut self.class_editor
    }

    pub fn holiday_editor(&self) -> &HolidayEditor {
        &self.holiday_editor
    }

    pub fn holiday_editor_mut(&mut self) -> &mut HolidayEditor {
        &mut self.holiday_editor
    }

    pub fn vacation_editor(&self) -> &VacationEditor {
        &self.vacation_editor
    }

    pub fn vacation_editor_mut(&mut self) -> &mut VacationEditor {
        &mut self.vacation_editor
    }

    pub fn open_editor(&self) -> Option<EntityKind> {
        if self.class_editor.is_open() {
            Some(EntityKind::Class)
        } else if self.holiday_editor.is_open() {
            Some(EntityKind::Holiday)
        } else if self.vacation_editor.is_open() {
            Some(EntityKind::Vacation)
        } else {
            None
        }
    }

    /// Fire any message clears that have come due.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.status.tick(now);
    }

    /// Read both collections. On failure nothing already loaded is touched.
    pub fn load(&mut self) -> Result<(), ManagerError> {
        self.tick();
        self.status.clear_error();

        let loaded = self
            .store
            .get_regular_schedule()
            .and_then(|days| Ok((days, self.store.get_holidays()?)));
        let (days, entries) = match loaded {
            Ok(parts) => parts,
            Err(err) => {
                error!(error = %err, "failed to load calendar");
                self.status.post_error(LOAD_FAILED_MESSAGE);
                return Err(ManagerError::Load(err));
            }
        };

        let (mut holidays, mut vacations) = partition_entries(entries);
        let mut schedule = WeeklySchedule::from_days(days);
        let unnamed_classes =
            fill_missing_ids(schedule.sessions_mut().map(|session| &mut session.id));
        let unnamed_entries = fill_missing_ids(
            holidays
                .iter_mut()
                .map(|holiday| &mut holiday.id)
                .chain(vacations.iter_mut().map(|period| &mut period.id)),
        );
        warn_inconsistent(&schedule, &vacations);

        self.schedule = schedule;
        self.holidays = holidays;
        self.vacations = vacations;
        info!(
            sessions = self.schedule.session_count(),
            holidays = self.holidays.len(),
            vacations = self.vacations.len(),
            "calendar loaded"
        );

        // Records stored without an id keep the one assigned here.
        if unnamed_classes > 0 {
            info!(count = unnamed_classes, "storing ids assigned to classes");
            if let Err(err) = self.persist(EntityKind::Class) {
                warn!(error = %err, "assigned class ids were not stored");
            }
        }
        if unnamed_entries > 0 {
            info!(count = unnamed_entries, "storing ids assigned to holidays and vacations");
            if let Err(err) = self.persist(EntityKind::Holiday) {
                warn!(error = %err, "assigned holiday ids were not stored");
            }
        }
        Ok(())
    }

    fn find_entity(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        match kind {
            EntityKind::Class => self.schedule.find_session(id).cloned().map(Entity::Class),
            EntityKind::Holiday => self
                .holidays
                .iter()
                .find(|holiday| holiday.id == id)
                .cloned()
                .map(Entity::Holiday),
            EntityKind::Vacation => self
                .vacations
                .iter()
                .find(|period| period.id == id)
                .cloned()
                .map(Entity::Vacation),
        }
    }

    /// Re-read the selectable group names from the group directory.
    pub fn refresh_group_options(&mut self) {
        match self.groups.get_all_student_groups() {
            Ok(groups) => self.group_options = group_names(&groups),
            Err(err) => {
                warn!(error = %err, "student groups unavailable");
                self.group_options.clear();
            }
        }
    }

    fn close_all_editors(&mut self) {
        self.class_editor.close();
        self.holiday_editor.close();
        self.vacation_editor.close();
    }

    /// Open the editor for `kind`, prefilled from the entity with `id` or
    /// empty when `id` is `None`. Any other open editor is closed.
    pub fn add_or_edit(&mut self, kind: EntityKind, id: Option<&str>) -> Result<(), ManagerError> {
        self.tick();
        let existing = match id {
            Some(id) => Some(self.find_entity(kind, id).ok_or_else(|| ManagerError::NotFound {
                kind,
                id: id.to_string(),
            })?),
            None => None,
        };

        self.close_all_editors();
        match (&existing, kind) {
            (Some(Entity::Class(session)), _) => self.class_editor.open(Some(session)),
            (Some(Entity::Holiday(holiday)), _) => self.holiday_editor.open(Some(holiday)),
            (Some(Entity::Vacation(period)), _) => self.vacation_editor.open(Some(period)),
            (None, EntityKind::Class) => self.class_editor.open(None),
            (None, EntityKind::Holiday) => self.holiday_editor.open(None),
            (None, EntityKind::Vacation) => self.vacation_editor.open(None),
        }
        if kind == EntityKind::Class {
            self.refresh_group_options();
        }
        debug!(%kind, editing = existing.is_some(), "editor opened");
        self.editing = existing;
        Ok(())
    }

    pub fn cancel_editor(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Class => self.class_editor.cancel(),
            EntityKind::Holiday => self.holiday_editor.cancel(),
            EntityKind::Vacation => self.vacation_editor.cancel(),
        }
        self.editing = None;
    }

    /// Submit the open editor of `kind` and save its entity.
    pub fn submit_editor(&mut self, kind: EntityKind) -> Result<Entity, ManagerError> {
        self.tick();
        let submitted = match kind {
            EntityKind::Class => submit(&mut self.class_editor, kind).map(Entity::Class),
            EntityKind::Holiday => submit(&mut self.holiday_editor, kind).map(Entity::Holiday),
            EntityKind::Vacation => submit(&mut self.vacation_editor, kind).map(Entity::Vacation),
        };
        let entity = submitted?;
        self.on_editor_save(entity.clone())?;
        Ok(entity)
    }

    /// Open the matching editor on a caller-built draft and submit it. A draft
    /// carrying the id of a known entity edits that entity. The editor is
    /// closed again whatever the outcome; the caller keeps its own draft.
    pub fn submit_draft(&mut self, draft: EntityDraft) -> Result<Entity, ManagerError> {
        let kind = draft.kind();
        self.close_all_editors();
        self.editing = draft.id().and_then(|id| self.find_entity(kind, id));
        match draft {
            EntityDraft::Class(draft) => self.class_editor.open_with_draft(draft),
            EntityDraft::Holiday(draft) => self.holiday_editor.open_with_draft(draft),
            EntityDraft::Vacation(draft) => self.vacation_editor.open_with_draft(draft),
        }
        let result = self.submit_editor(kind);
        if result.is_err() {
            self.close_all_editors();
            self.editing = None;
        }
        result
    }

    /// Merge many holidays and vacation periods by id and store the combined
    /// collection once. Open editors are left alone.
    pub fn import_entries(&mut self, entries: Vec<CalendarEntry>) -> Result<usize, ManagerError> {
        self.tick();
        self.status.clear_error();
        let count = entries.len();
        for entry in entries {
            match entry {
                CalendarEntry::Holiday(mut holiday) => {
                    if holiday.id.trim().is_empty() {
                        holiday.id = new_entity_id();
                    }
                    upsert_by_id(&mut self.holidays, holiday);
                }
                CalendarEntry::Vacation(mut period) => {
                    if period.id.trim().is_empty() {
                        period.id = new_entity_id();
                    }
                    upsert_by_id(&mut self.vacations, period);
                }
            }
        }

        self.persist(EntityKind::Holiday)?;
        let now = self.clock.now();
        self.status.post_success(format!("{count} entries imported."), now);
        info!(count, "calendar entries imported");
        Ok(count)
    }

    /// Merge a finished entity into its collection by id and persist that
    /// collection. The in-memory change stays even if the write fails.
    pub fn on_editor_save(&mut self, entity: Entity) -> Result<(), ManagerError> {
        self.tick();
        self.status.clear_error();
        let kind = entity.kind();
        let id = entity.id().to_string();

        match entity {
            Entity::Class(session) => {
                let placement = self.schedule.upsert_session(session);
                debug!(%id, ?placement, "class merged");
            }
            Entity::Holiday(holiday) => {
                upsert_by_id(&mut self.holidays, holiday);
            }
            Entity::Vacation(period) => {
                upsert_by_id(&mut self.vacations, period);
            }
        }

        self.persist(kind)?;
        self.cancel_editor(kind);
        let now = self.clock.now();
        self.status.post_success(saved_message(kind), now);
        info!(%kind, %id, "entity saved");
        Ok(())
    }

    /// Remove an entity by id and persist. Day entries of the weekly schedule
    /// are kept even when emptied. Returns whether anything matched.
    pub fn delete_entity(&mut self, kind: EntityKind, id: &str) -> Result<bool, ManagerError> {
        self.tick();
        self.status.clear_error();
        let removed = match kind {
            EntityKind::Class => self.schedule.remove_session(id),
            EntityKind::Holiday => remove_by_id(&mut self.holidays, id),
            EntityKind::Vacation => remove_by_id(&mut self.vacations, id),
        };
        if !removed {
            debug!(%kind, %id, "nothing to delete");
        }

        self.persist(kind)?;
        let now = self.clock.now();
        self.status.post_success(deleted_message(kind), now);
        info!(%kind, %id, removed, "entity deleted");
        Ok(removed)
    }

    pub fn handle_list_action(&mut self, row: RowAction) -> Result<(), ManagerError> {
        match row.action {
            ListAction::Edit(id) => self.add_or_edit(row.kind, Some(&id)),
            ListAction::Delete(id) => self.delete_entity(row.kind, &id).map(|_| ()),
        }
    }

    fn persist(&mut self, kind: EntityKind) -> Result<(), ManagerError> {
        let result = match kind {
            EntityKind::Class => self.store.save_regular_schedule(self.schedule.days()),
            EntityKind::Holiday | EntityKind::Vacation => self
                .store
                .save_holidays(&combine_entries(&self.holidays, &self.vacations)),
        };
        result.map_err(|source| {
            error!(%kind, error = %source, "failed to persist collection");
            self.status.post_error(SAVE_FAILED_MESSAGE);
            ManagerError::Save { kind, source }
        })
    }
}

/// Give every empty id a fresh one. Returns how many were filled.
fn fill_missing_ids<'a>(ids: impl Iterator<Item = &'a mut String>) -> usize {
    let mut filled = 0;
    for id in ids.filter(|id| id.trim().is_empty()) {
        *id = new_entity_id();
        filled += 1;
    }
    filled
}

fn warn_inconsistent(schedule: &WeeklySchedule, vacations: &[VacationPeriod]) {
    for session in schedule.sessions().filter(|session| !session.has_valid_times()) {
        warn!(id = %session.id, day = %session.day, "stored class does not end after it starts");
    }
    for period in vacations.iter().filter(|period| !period.has_valid_range()) {
        warn!(
            id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            "stored vacation ends before it starts"
        );
    }
}

fn submit<D: Draft>(editor: &mut Editor<D>, kind: EntityKind) -> Result<D::Entity, ManagerError> {
    editor.submit().map_err(|err| match err {
        EditorError::Closed => ManagerError::EditorClosed(kind),
        EditorError::Invalid(errors) => ManagerError::Validation(errors),
    })
}

fn saved_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class => "Class saved.",
        EntityKind::Holiday => "Holiday saved.",
        EntityKind::Vacation => "Vacation period saved.",
    }
}

fn deleted_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class => "Class deleted.",
        EntityKind::Holiday => "Holiday deleted.",
        EntityKind::Vacation => "Vacation period deleted.",
    }
}
