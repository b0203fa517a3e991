use std::sync::Arc;

use nebula_core::{
    Clock, CompanionState, Destination, Engine, EngineError, Item, PulseResult, Session,
    SessionError, Signal, SystemClock, TriggerKind,
};
use nebula_store::Store;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::render;

const DEFAULT_JOURNAL_LIMIT: usize = 10;

#[derive(Clone)]
pub struct NebulaServer {
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

struct ServerState {
    store: Store,
    engine: Engine,
    /// Storage key of the companion this server drives.
    id: String,
    name: String,
    rng: SmallRng,
}

impl ServerState {
    /// Load the companion, hatching it if the store has none yet.
    fn checkout(
        &mut self,
        now: f64,
    ) -> Result<(Session<&mut Store>, &Engine, &mut SmallRng), McpError> {
        let ServerState {
            store,
            engine,
            id,
            name,
            rng,
        } = self;
        let engine: &Engine = engine;
        let session = Session::open(store, id.as_str(), || {
            tracing::info!("hatching new companion '{name}'");
            engine.new_companion(name, now, &mut *rng)
        })
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok((session, engine, rng))
    }

    /// Run one engine operation, flush, and return the operation's value
    /// with a fresh status view.
    fn run<T>(
        &mut self,
        op: impl FnOnce(&Engine, &mut CompanionState, f64, &mut SmallRng) -> Result<T, EngineError>,
    ) -> Result<(T, Value), McpError> {
        let now = SystemClock.now();
        let (mut session, engine, rng) = self.checkout(now)?;
        let value = session
            .apply(|s| op(engine, s, now, rng))
            .map_err(session_error)?;
        let status = render::companion_view(&engine.status(session.state(), now));
        Ok((value, status))
    }

    /// Status without moving vitals. A companion seen for the first time
    /// is saved so it keeps its hatch time.
    fn view(&mut self) -> Result<Value, McpError> {
        let now = SystemClock.now();
        let (mut session, engine, _) = self.checkout(now)?;
        if session.is_new() {
            session
                .flush()
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        }
        Ok(render::companion_view(&engine.status(session.state(), now)))
    }
}

/// Rejections the chat host may repeat to the user, so they carry no
/// numbers either.
fn rejection(e: &EngineError) -> McpError {
    let message = match e {
        EngineError::InsufficientEnergy { .. } => {
            "not enough energy for that expedition; let the companion rest first".to_string()
        }
        EngineError::InvalidGuess(_) => "guesses run from one to ten".to_string(),
        other => other.to_string(),
    };
    McpError::invalid_params(message, None)
}

/// Rejected operations are the caller's problem; storage failures are ours.
fn session_error(e: SessionError) -> McpError {
    match e {
        SessionError::Engine(e) => rejection(&e),
        SessionError::Persistence(e) => McpError::internal_error(e.to_string(), None),
    }
}

fn json_result(value: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )])
}

fn parse_arg<T>(raw: &str) -> Result<T, McpError>
where
    T: std::str::FromStr<Err = EngineError>,
{
    raw.parse().map_err(|e: EngineError| rejection(&e))
}

impl NebulaServer {
    pub fn new(store: Store, engine: Engine, id: &str, name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState {
                store,
                engine,
                id: id.to_string(),
                name: name.to_string(),
                rng: SmallRng::from_os_rng(),
            })),
            tool_router: Self::tool_router(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlayRequest {
    /// "comet", "paper" or "scissors"
    pub signal: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PulseRequest {
    /// Guess from one to ten
    pub guess: u8,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FeedRequest {
    /// Cargo item: apple, berry, coffee, magic cookie or star mote
    pub item: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LaunchRequest {
    /// asteroid belt, stellar nursery or crab nebula
    pub destination: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct JournalRequest {
    /// Number of most recent entries (default ten)
    pub limit: Option<usize>,
}

#[tool_router]
impl NebulaServer {
    #[tool(
        description = "Show the companion: mood, voice, avatar, tier, trait, mission and cargo. Read-only; never moves vitals."
    )]
    async fn nebula_status(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let status = state.view()?;
        Ok(json_result(&status))
    }

    #[tool(description = "Bring vitals up to date with the time elapsed since the last sync.")]
    async fn nebula_sync(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (report, status) =
            state.run(|engine, s, now, _| Ok(engine.sync(s, &TriggerKind::ManualSync, now)))?;
        let result = json!({
            "sync": report.as_ref().map(render::sync_view),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Play one round of Comet-Paper-Scissors against the companion.")]
    async fn nebula_play(
        &self,
        Parameters(req): Parameters<PlayRequest>,
    ) -> Result<CallToolResult, McpError> {
        let signal: Signal = parse_arg(&req.signal)?;
        let mut state = self.state.lock().await;
        let (out, status) =
            state.run(|engine, s, now, rng| engine.play_signal(s, signal, now, rng))?;
        let round = out.value.round;
        let result = json!({
            "player": round.player.label(),
            "companion": round.companion.label(),
            "outcome": format!("{:?}", round.outcome).to_lowercase(),
            "award": render::award_view(&out.value.award),
            "hooks": render::hooks_json(&out.hooks),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(
        description = "Guess the companion's Number Pulse, from one to ten. A round opens on the first guess and closes when the pulse locks."
    )]
    async fn nebula_pulse(
        &self,
        Parameters(req): Parameters<PulseRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (out, status) = state.run(|engine, s, now, rng| engine.pulse(s, req.guess, now, rng))?;
        let result = match out.value.result {
            PulseResult::TooLow => "too_low",
            PulseResult::TooHigh => "too_high",
            PulseResult::Locked { .. } => "locked",
        };
        let result = json!({
            "result": result,
            "award": out.value.award.as_ref().map(render::award_view),
            "hooks": render::hooks_json(&out.hooks),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Count one conversation turn with the companion.")]
    async fn nebula_chat(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (out, status) = state.run(|engine, s, now, rng| engine.chat_turn(s, now, rng))?;
        let result = json!({
            "milestone": out.value.milestone.as_ref().map(render::award_view),
            "hooks": render::hooks_json(&out.hooks),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Feed the companion an item from its cargo.")]
    async fn nebula_feed(
        &self,
        Parameters(req): Parameters<FeedRequest>,
    ) -> Result<CallToolResult, McpError> {
        let item: Item = parse_arg(&req.item)?;
        let mut state = self.state.lock().await;
        let (out, status) = state.run(|engine, s, now, _| engine.feed(s, item, now))?;
        let result = json!({
            "item": out.value.item.label(),
            "after_effect": out.value.after_effect.map(|d| d.label()),
            "hooks": render::hooks_json(&out.hooks),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Put the companion into a deep sleep.")]
    async fn nebula_rest(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (report, status) = state.run(|engine, s, now, _| engine.rest(s, now))?;
        let result = json!({
            "sync": render::sync_view(&report),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(description = "Wake the companion from a deep sleep.")]
    async fn nebula_wake(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (report, status) = state.run(|engine, s, now, _| engine.wake(s, now))?;
        let result = json!({
            "sync": render::sync_view(&report),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(
        description = "Launch an expedition. Costs energy; only one mission may be active at a time."
    )]
    async fn nebula_launch(
        &self,
        Parameters(req): Parameters<LaunchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let destination: Destination = parse_arg(&req.destination)?;
        let mut state = self.state.lock().await;
        let (mission, status) =
            state.run(|engine, s, now, _| engine.start_mission(s, destination, now))?;
        let result = json!({
            "destination": mission.destination.name(),
            "status": status,
        });
        Ok(json_result(&result))
    }

    #[tool(
        description = "Check in on the active expedition. Completes it, awards experience and rolls loot once it is due."
    )]
    async fn nebula_check(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let (out, status) =
            state.run(|engine, s, now, rng| Ok(engine.check_mission(s, now, rng)))?;
        let mut result = render::mission_check_view(&out.value);
        result["hooks"] = render::hooks_json(&out.hooks);
        result["status"] = status;
        Ok(json_result(&result))
    }

    #[tool(description = "Recent journal entries, oldest first.")]
    async fn nebula_journal(
        &self,
        Parameters(req): Parameters<JournalRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = req.limit.unwrap_or(DEFAULT_JOURNAL_LIMIT);
        let mut state = self.state.lock().await;
        let (entries, _) = state.run(|_, s, _, _| {
            Ok(s.recent_journal(limit)
                .iter()
                .map(|e| e.text.clone())
                .collect::<Vec<_>>())
        })?;
        Ok(json_result(&json!({ "entries": entries })))
    }

    #[tool(description = "Replace the companion with a fresh hatchling of the same name.")]
    async fn nebula_reset(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let ((), status) = state.run(|engine, s, now, rng| {
            engine.reset(s, now, rng);
            Ok(())
        })?;
        Ok(json_result(&json!({ "reset": true, "status": status })))
    }
}

#[tool_handler]
impl ServerHandler for NebulaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "You are caring for a virtual space companion.\n\n\
                 - Call nebula_status to see how it is doing. Status is free: it never changes vitals.\n\
                 - You see the companion through its mood, never through raw stats. Speak in the \
                   manner its voice describes, and never quote numbers about it.\n\
                 - Vitals (hunger, happiness, energy) only move when you act: sync, play, pulse, chat, \
                   feed, rest, wake, or check on a returning expedition.\n\
                 - Games, chats and expeditions earn experience. The companion grows from Baby to \
                   Teen and then to Adult.\n\
                 - Only one expedition can be out at a time. Call nebula_check later to bring the \
                   companion home.\n\
                 - Hooks in responses are short lines you may weave into conversation."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
