//! Roster REST API.
//!
//! Endpoints:
//!
//! - `GET    /api/data`                                   — Roster with computed season fields
//! - `POST   /api/meta`                                   — Set the current week
//! - `POST   /api/characters`                             — Add a character
//! - `DELETE /api/characters/{id}`                        — Delete a character
//! - `POST   /api/characters/reorder`                     — Reorder characters
//! - `PUT    /api/characters/{id}/professions`            — Replace professions
//! - `POST   /api/character/{id}/gear`                    — Manual gear override
//! - `POST   /api/character/{id}/crests`                  — Crests collected this week
//! - `POST   /api/character/{id}/profession`              — Profession progress
//! - `POST   /api/character/{id}/tasks`                   — Task completion
//! - `POST   /api/character/{id}/config`                  — Rename / realm
//! - `GET    /api/character/{id}/weekly-progress?week=`   — Stored weekly record
//! - `POST   /api/character/{id}/weekly-progress`         — Save weekly record groups
//! - `GET    /api/character/{id}/vault?week=`             — Vault projection and grid
//! - `GET    /api/vault`                                  — Every character's vault
//! - `POST   /api/character/{id}/bis`                     — Add BiS item
//! - `PUT    /api/character/{id}/bis/{bis_id}`            — Edit BiS item
//! - `DELETE /api/character/{id}/bis/{bis_id}`            — Delete BiS item
//! - `POST   /api/character/{id}/talents`                 — Add talent build
//! - `PUT    /api/character/{id}/talents/{talent_id}`     — Edit talent build
//! - `DELETE /api/character/{id}/talents/{talent_id}`     — Delete talent build
//! - `POST   /api/reset-daily`                            — Clear daily tasks

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use warband_core::character::{
    BisItem, BisUpdate, Character, CharacterConfigUpdate, CrestKind, GearUpdate, NewBisItem,
    NewCharacter, NewTalentBuild, ProfessionUpdate, TalentBuild, TalentBuildUpdate,
};
use warband_core::error::{RosterError, StoreError};
use warband_core::grid::VaultGrid;
use warband_core::progress::{WeeklyProgressRecord, WeeklyProgressUpdate};
use warband_core::roster::{Roster, RosterMeta, TaskKind};
use warband_core::season::{self, SeasonWeek, WeekPlan};
use warband_core::store::RosterStore;
use warband_core::vault::RewardSlotProjection;

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the roster API.
pub struct ApiState {
    pub store: Arc<dyn RosterStore>,
    /// Serializes every load-modify-save cycle.
    write_lock: Mutex<()>,
}

impl ApiState {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the roster API router. Routes carry their full `/api` prefix.
pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/api/data", get(get_data_handler))
        .route("/api/meta", post(update_meta_handler))
        .route("/api/characters", post(add_character_handler))
        .route("/api/characters/reorder", post(reorder_handler))
        .route(
            "/api/characters/{id}",
            axum::routing::delete(delete_character_handler),
        )
        .route("/api/characters/{id}/professions", put(professions_handler))
        .route("/api/character/{id}/gear", post(gear_handler))
        .route("/api/character/{id}/crests", post(crests_handler))
        .route("/api/character/{id}/profession", post(profession_handler))
        .route("/api/character/{id}/tasks", post(tasks_handler))
        .route("/api/character/{id}/config", post(config_handler))
        .route(
            "/api/character/{id}/weekly-progress",
            get(get_weekly_progress_handler).post(save_weekly_progress_handler),
        )
        .route("/api/character/{id}/vault", get(character_vault_handler))
        .route("/api/vault", get(roster_vault_handler))
        .route("/api/character/{id}/bis", post(add_bis_handler))
        .route(
            "/api/character/{id}/bis/{bis_id}",
            put(update_bis_handler).delete(delete_bis_handler),
        )
        .route("/api/character/{id}/talents", post(add_talent_handler))
        .route(
            "/api/character/{id}/talents/{talent_id}",
            put(update_talent_handler).delete(delete_talent_handler),
        )
        .route("/api/reset-daily", post(reset_daily_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct CharacterResponse {
    success: bool,
    character: Character,
}

#[derive(Serialize)]
struct CrestSummary {
    collected_this_week: u32,
    total_collected: u64,
}

#[derive(Serialize)]
struct CharacterView<'a> {
    #[serde(flatten)]
    character: &'a Character,
    avg_ilvl: f64,
    crest_summary: BTreeMap<CrestKind, CrestSummary>,
}

#[derive(Serialize)]
struct DataResponse<'a> {
    meta: &'a RosterMeta,
    characters: Vec<CharacterView<'a>>,
    weekly_target: u32,
    weekly_crest_cap: u32,
    weekly_tasks: &'static WeekPlan,
}

#[derive(Deserialize)]
struct MetaRequest {
    current_week: i64,
}

#[derive(Serialize)]
struct MetaResponse {
    success: bool,
    meta: RosterMeta,
}

#[derive(Deserialize)]
struct ReorderRequest {
    #[serde(default)]
    order: Vec<u32>,
}

#[derive(Deserialize)]
struct ProfessionsRequest {
    #[serde(default)]
    professions: Vec<String>,
}

#[derive(Serialize)]
struct GearResponse {
    success: bool,
    avg_ilvl: f64,
}

#[derive(Deserialize)]
struct CrestRequest {
    crest_type: String,
    collected_this_week: i64,
}

#[derive(Serialize)]
struct CrestResponse {
    success: bool,
    collected_this_week: u32,
}

#[derive(Deserialize)]
struct TaskRequest {
    task_type: TaskKind,
    task_id: String,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct WeekQuery {
    #[serde(default)]
    week: Option<i64>,
}

#[derive(Serialize)]
struct WeeklyProgressResponse {
    success: bool,
    week: SeasonWeek,
    record: WeeklyProgressRecord,
    vault: RewardSlotProjection,
}

#[derive(Serialize)]
struct VaultResponse {
    character_id: u32,
    name: String,
    week: SeasonWeek,
    projection: RewardSlotProjection,
    grid: VaultGrid,
}

#[derive(Serialize)]
struct RosterVaultResponse {
    week: SeasonWeek,
    characters: Vec<VaultResponse>,
}

#[derive(Serialize)]
struct BisResponse {
    success: bool,
    item: BisItem,
}

#[derive(Serialize)]
struct TalentResponse {
    success: bool,
    build: TalentBuild,
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn error_body(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
}

fn roster_error(e: RosterError) -> ApiError {
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    error_body(status, e.to_string())
}

fn store_error(e: StoreError) -> ApiError {
    error!(error = %e, "Roster store failure");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn parse_week(week: Option<i64>, current: SeasonWeek) -> Result<SeasonWeek, ApiError> {
    match week {
        None => Ok(current),
        Some(w) => SeasonWeek::new(w).ok_or_else(|| roster_error(RosterError::InvalidWeek(w))),
    }
}

async fn read_roster(state: &ApiState) -> Result<Roster, ApiError> {
    state.store.load().await.map_err(store_error)
}

/// Run one load-modify-save cycle under the write lock. Nothing is saved
/// when `f` fails.
async fn mutate<T, F>(state: &ApiState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Roster) -> Result<T, RosterError>,
{
    let _guard = state.write_lock.lock().await;
    let mut roster = read_roster(state).await?;
    let out = f(&mut roster).map_err(roster_error)?;
    roster.touch();
    state.store.save(&roster).await.map_err(store_error)?;
    Ok(out)
}

fn character_view(character: &Character, week: SeasonWeek) -> CharacterView<'_> {
    let crest_summary = character
        .crests
        .iter()
        .map(|(kind, ledger)| {
            (
                *kind,
                CrestSummary {
                    collected_this_week: ledger.collected_in(week),
                    total_collected: ledger.total_collected(),
                },
            )
        })
        .collect();
    CharacterView {
        character,
        avg_ilvl: character.average_ilvl(),
        crest_summary,
    }
}

fn vault_response(roster: &Roster, character: &Character, week: SeasonWeek) -> Result<VaultResponse, RosterError> {
    let projection = roster.project_vault(character.id, Some(week))?;
    Ok(VaultResponse {
        character_id: character.id,
        name: character.name.clone(),
        week,
        grid: VaultGrid::from_projection(&projection),
        projection,
    })
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn get_data_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = read_roster(&state).await?;
    let week = roster.current_week();
    let response = DataResponse {
        meta: &roster.meta,
        characters: roster
            .characters
            .iter()
            .map(|c| character_view(c, week))
            .collect(),
        weekly_target: season::weekly_target(week.get() as i64),
        weekly_crest_cap: season::weekly_crest_cap(week),
        weekly_tasks: season::weekly_tasks(week.get() as i64),
    };
    // Borrowed view: serialize before the roster goes out of scope.
    let body = serde_json::to_value(&response)
        .map_err(|e| error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(body))
}

async fn update_meta_handler(
    State(state): State<SharedApiState>,
    Json(req): Json<MetaRequest>,
) -> Result<Json<MetaResponse>, ApiError> {
    let meta = mutate(&state, |roster| {
        roster.set_current_week(req.current_week)?;
        Ok(roster.meta.clone())
    })
    .await?;
    Ok(Json(MetaResponse { success: true, meta }))
}

async fn add_character_handler(
    State(state): State<SharedApiState>,
    Json(req): Json<NewCharacter>,
) -> Result<(StatusCode, Json<CharacterResponse>), ApiError> {
    let character = mutate(&state, |roster| Ok(roster.add_character(req).clone())).await?;
    Ok((
        StatusCode::CREATED,
        Json(CharacterResponse {
            success: true,
            character,
        }),
    ))
}

async fn delete_character_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| roster.delete_character(id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn reorder_handler(
    State(state): State<SharedApiState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| {
        roster.reorder(&req.order);
        Ok(())
    })
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn professions_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<ProfessionsRequest>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let character = mutate(&state, |roster| {
        roster.set_professions(id, req.professions)?;
        roster.character(id).cloned()
    })
    .await?;
    Ok(Json(CharacterResponse {
        success: true,
        character,
    }))
}

async fn gear_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<GearUpdate>,
) -> Result<Json<GearResponse>, ApiError> {
    let avg_ilvl = mutate(&state, |roster| roster.update_gear(id, &req)).await?;
    Ok(Json(GearResponse {
        success: true,
        avg_ilvl,
    }))
}

async fn crests_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<CrestRequest>,
) -> Result<Json<CrestResponse>, ApiError> {
    let kind = CrestKind::parse(&req.crest_type).map_err(roster_error)?;
    let collected_this_week =
        mutate(&state, |roster| roster.record_crests(id, kind, req.collected_this_week)).await?;
    Ok(Json(CrestResponse {
        success: true,
        collected_this_week,
    }))
}

async fn profession_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<ProfessionUpdate>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let character = mutate(&state, |roster| {
        roster.update_profession(id, &req)?;
        roster.character(id).cloned()
    })
    .await?;
    Ok(Json(CharacterResponse {
        success: true,
        character,
    }))
}

async fn tasks_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| {
        roster.set_task(id, req.task_type, &req.task_id, req.done)
    })
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn config_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<CharacterConfigUpdate>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let character = mutate(&state, |roster| roster.update_config(id, req).cloned()).await?;
    Ok(Json(CharacterResponse {
        success: true,
        character,
    }))
}

async fn get_weekly_progress_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeeklyProgressResponse>, ApiError> {
    let roster = read_roster(&state).await?;
    let week = parse_week(query.week, roster.current_week())?;
    let record = roster
        .weekly_record(id, week)
        .map_err(roster_error)?
        .cloned()
        .unwrap_or_default();
    let vault = warband_core::vault::project(Some(&record), week.get() as i64);
    Ok(Json(WeeklyProgressResponse {
        success: true,
        week,
        record,
        vault,
    }))
}

async fn save_weekly_progress_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(update): Json<WeeklyProgressUpdate>,
) -> Result<Json<WeeklyProgressResponse>, ApiError> {
    let (week, record) = mutate(&state, |roster| {
        let week = roster.current_week();
        let record = roster.upsert_weekly_progress(id, week, update)?.clone();
        Ok((week, record))
    })
    .await?;
    info!(id, week = week.get(), "Weekly progress updated");
    let vault = warband_core::vault::project(Some(&record), week.get() as i64);
    Ok(Json(WeeklyProgressResponse {
        success: true,
        week,
        record,
        vault,
    }))
}

async fn character_vault_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<VaultResponse>, ApiError> {
    let roster = read_roster(&state).await?;
    let week = parse_week(query.week, roster.current_week())?;
    let character = roster.character(id).map_err(roster_error)?;
    vault_response(&roster, character, week)
        .map(Json)
        .map_err(roster_error)
}

async fn roster_vault_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<RosterVaultResponse>, ApiError> {
    let roster = read_roster(&state).await?;
    let week = roster.current_week();
    let characters = roster
        .characters
        .iter()
        .map(|c| vault_response(&roster, c, week))
        .collect::<Result<Vec<_>, _>>()
        .map_err(roster_error)?;
    Ok(Json(RosterVaultResponse { week, characters }))
}

async fn add_bis_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<NewBisItem>,
) -> Result<(StatusCode, Json<BisResponse>), ApiError> {
    let item = mutate(&state, |roster| {
        roster.character_mut(id)?.add_bis(req).cloned()
    })
    .await?;
    Ok((StatusCode::CREATED, Json(BisResponse { success: true, item })))
}

async fn update_bis_handler(
    State(state): State<SharedApiState>,
    Path((id, bis_id)): Path<(u32, u32)>,
    Json(req): Json<BisUpdate>,
) -> Result<Json<BisResponse>, ApiError> {
    let item = mutate(&state, |roster| {
        roster.character_mut(id)?.update_bis(bis_id, req).cloned()
    })
    .await?;
    Ok(Json(BisResponse { success: true, item }))
}

async fn delete_bis_handler(
    State(state): State<SharedApiState>,
    Path((id, bis_id)): Path<(u32, u32)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| {
        roster.character_mut(id)?.delete_bis(bis_id);
        Ok(())
    })
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn add_talent_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<u32>,
    Json(req): Json<NewTalentBuild>,
) -> Result<(StatusCode, Json<TalentResponse>), ApiError> {
    let build = mutate(&state, |roster| {
        roster.character_mut(id)?.add_talent_build(req).cloned()
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(TalentResponse {
            success: true,
            build,
        }),
    ))
}

async fn update_talent_handler(
    State(state): State<SharedApiState>,
    Path((id, talent_id)): Path<(u32, u32)>,
    Json(req): Json<TalentBuildUpdate>,
) -> Result<Json<TalentResponse>, ApiError> {
    let build = mutate(&state, |roster| {
        roster
            .character_mut(id)?
            .update_talent_build(talent_id, req)
            .cloned()
    })
    .await?;
    Ok(Json(TalentResponse {
        success: true,
        build,
    }))
}

async fn delete_talent_handler(
    State(state): State<SharedApiState>,
    Path((id, talent_id)): Path<(u32, u32)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| {
        roster.character_mut(id)?.delete_talent_build(talent_id);
        Ok(())
    })
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn reset_daily_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    mutate(&state, |roster| {
        roster.reset_daily();
        Ok(())
    })
    .await?;
    Ok(Json(SuccessResponse { success: true }))
}
