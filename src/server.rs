//! HTTP routes in front of the agents

use std::sync::Arc;
use axum::{
  extract::{Path, State}
, http::StatusCode
, response::{IntoResponse, Response}
, routing::{get, post}
, Json, Router
};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::agents::{Agent, EventGenerator, Summarizer};
use crate::config::{AgentOptions, ServerConfig};
use crate::{AgentInfo, Context};

/// Shared application state
#[derive(Clone)]
pub struct AppState
{   pub event_generator: Arc<EventGenerator>
  , pub summarizer: Arc<Summarizer>
}

impl AppState
{   pub fn new(
      event_generator: EventGenerator
    , summarizer: Summarizer
    ) -> Self
    {   AppState
        {   event_generator: Arc::new(event_generator)
          , summarizer: Arc::new(summarizer)
        }
    }

    /// Build both agents from the same options; fails on a missing key
    pub fn from_options(options: AgentOptions) -> crate::Result<Self>
    {   Ok(Self::new(
          EventGenerator::new(options.clone())?,
          Summarizer::new(options)?
        ))
    }

    fn agent(&self, name: &str) -> Option<&dyn Agent>
    {   match name.to_ascii_lowercase().as_str()
        {   "eventgenerator" | "event-generator" => {
              Some(self.event_generator.as_ref())
            }
          , "summarizer" => Some(self.summarizer.as_ref())
          , _ => None
        }
    }
}

/// JSON error body with a status code
#[derive(Debug)]
pub struct ApiError
{   status: StatusCode
  , message: String
}

impl From<crate::Error> for ApiError
{   fn from(err: crate::Error) -> Self
    {   let status = if err.is_configuration()
        {   StatusCode::INTERNAL_SERVER_ERROR
        } else
        {   StatusCode::BAD_GATEWAY
        };
        ApiError
        {   status
          , message: err.to_string()
        }
    }
}

impl IntoResponse for ApiError
{   fn into_response(self) -> Response
    {   (self.status, Json(json!({ "error": self.message })))
          .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest
{   event_type: String
  , audience: String
  , duration: String
  , #[serde(default)]
    constraints: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest
{   content: String
  , #[serde(default)]
    length: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletRequest
{   content: String
  , #[serde(default)]
    max_points: Option<u32>
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest
{   input: String
  , #[serde(default)]
    context: Option<Context>
}

fn result_body(text: String) -> Json<Value>
{   Json(json!({ "result": text }))
}

async fn welcome() -> Json<Value>
{   Json(json!({ "message": "Welcome to the API" }))
}

async fn echo(Json(body): Json<Value>) -> Json<Value>
{   debug!("Echoing test payload");
    Json(json!({ "message": "Test endpoint", "data": body }))
}

async fn list_agents(State(state): State<AppState>)
  -> Json<Vec<AgentInfo>>
{   Json(vec![state.event_generator.info(), state.summarizer.info()])
}

async fn generate_event(
  State(state): State<AppState>
, Json(request): Json<EventRequest>
) -> Result<Json<Value>, ApiError>
{   let text = state.event_generator
      .generate_event(
        &request.event_type,
        &request.audience,
        &request.duration,
        request.constraints.as_deref()
      )
      .await
      .map_err(|e| {
        error!("Event generation failed: {}", e);
        ApiError::from(e)
      })?;
    Ok(result_body(text))
}

async fn summarize(
  State(state): State<AppState>
, Json(request): Json<SummaryRequest>
) -> Result<Json<Value>, ApiError>
{   let context = request.length.map(|length| {
      Context::new().with(crate::agents::summarizer::LENGTH_KEY, length)
    });
    let text = state.summarizer
      .process(&request.content, context.as_ref())
      .await
      .map_err(|e| {
        error!("Summary failed: {}", e);
        ApiError::from(e)
      })?;
    Ok(result_body(text))
}

async fn bullet_summary(
  State(state): State<AppState>
, Json(request): Json<BulletRequest>
) -> Result<Json<Value>, ApiError>
{   let text = state.summarizer
      .create_bullet_summary(&request.content, request.max_points)
      .await
      .map_err(|e| {
        error!("Bullet summary failed: {}", e);
        ApiError::from(e)
      })?;
    Ok(result_body(text))
}

async fn process(
  State(state): State<AppState>
, Path(name): Path<String>
, Json(request): Json<ProcessRequest>
) -> Result<Json<Value>, ApiError>
{   let agent = state.agent(&name)
      .ok_or_else(|| ApiError
      {   status: StatusCode::NOT_FOUND
        , message: format!("Unknown agent: {}", name)
      })?;
    let text = agent
      .process(&request.input, request.context.as_ref())
      .await
      .map_err(|e| {
        error!("{} failed: {}", name, e);
        ApiError::from(e)
      })?;
    Ok(result_body(text))
}

pub fn router(state: AppState) -> Router
{   let cors = CorsLayer::new()
      .allow_origin(Any)
      .allow_methods(Any)
      .allow_headers(Any);

    Router::new()
      .route("/", get(welcome))
      .route("/test", post(echo))
      .route("/agents", get(list_agents))
      .route("/agents/:name/process", post(process))
      .route("/events", post(generate_event))
      .route("/summaries", post(summarize))
      .route("/summaries/bullets", post(bullet_summary))
      .layer(cors)
      .with_state(state)
}

/// Serve on an already bound listener
pub async fn serve_on(
  listener: tokio::net::TcpListener
, state: AppState
) -> std::io::Result<()>
{   info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

pub async fn serve(config: &ServerConfig, state: AppState)
  -> std::io::Result<()>
{   let listener
      = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    serve_on(listener, state).await
}
