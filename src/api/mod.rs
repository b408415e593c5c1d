use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::nutrition::gaps::{calculate_gaps, GapsError};
use crate::prices::PriceAggregator;
use crate::providers::traits::VisionProvider;
use crate::vision::fridge::AnalysisResult;
use crate::vision::{alternatives, dish, fridge, VisionError};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const ANALYSIS_STORE_CAPACITY: usize = 64;

/// Completed fridge analyses keyed by handle, so `/gaps` clients can name the
/// analysis they mean instead of racing each other over one shared slot. The
/// most recent id doubles as the default for clients that don't carry one.
pub struct AnalysisStore {
    entries: Mutex<LruCache<Uuid, Arc<AnalysisResult>>>,
    latest: Mutex<Option<Uuid>>,
}

impl AnalysisStore {
    fn new() -> Self {
        let capacity =
            NonZeroUsize::new(ANALYSIS_STORE_CAPACITY).expect("store capacity is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            latest: Mutex::new(None),
        }
    }

    fn insert(&self, analysis: AnalysisResult) -> (Uuid, Arc<AnalysisResult>) {
        let id = Uuid::new_v4();
        let analysis = Arc::new(analysis);
        self.entries.lock().put(id, analysis.clone());
        *self.latest.lock() = Some(id);
        (id, analysis)
    }

    fn get(&self, id: Option<Uuid>) -> Option<Arc<AnalysisResult>> {
        let id = id.or_else(|| *self.latest.lock())?;
        self.entries.lock().get(&id).cloned()
    }
}

#[derive(Clone)]
pub struct AppState {
    vision: Arc<dyn VisionProvider>,
    prices: Arc<PriceAggregator>,
    analyses: Arc<AnalysisStore>,
}

#[derive(Deserialize, Validate)]
pub struct GapsQuery {
    #[validate(length(min = 1, max = 100))]
    recipe_name: String,
    analysis_id: Option<Uuid>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    analysis_id: Uuid,
    #[serde(flatten)]
    analysis: AnalysisResult,
}

#[derive(Serialize)]
struct InfoResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Create and configure the API router
pub fn create_api(vision: Arc<dyn VisionProvider>, prices: Arc<PriceAggregator>) -> Router {
    let state = AppState {
        vision,
        prices,
        analyses: Arc::new(AnalysisStore::new()),
    };

    // Fully permissive CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/", get(home))
        .route("/analyze", post(analyze_fridge_handler))
        .route("/gaps", post(gaps_handler))
        .route("/analyze-dish", post(analyze_dish_handler))
        .route("/analyze/dish", post(analyze_dish_handler))
        .route("/alternatives", post(alternatives_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn home() -> Response {
    Json(InfoResponse {
        message: "Backend running! Endpoints: /analyze, /gaps, /analyze-dish, /alternatives"
            .to_string(),
    })
    .into_response()
}

/// Pull the uploaded image out of the multipart body (the `file` field).
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, Response> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart upload: {}", e),
        )
    })? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read upload: {}", e),
                )
            })?;
            if bytes.is_empty() {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "Uploaded file is empty",
                ));
            }
            return Ok(bytes.to_vec());
        }
    }

    Err(error_response(
        StatusCode::BAD_REQUEST,
        "Missing 'file' field in upload",
    ))
}

fn vision_error_response(error: VisionError) -> Response {
    match error {
        VisionError::Upstream(e) => {
            log::error!("model call failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, format!("AI error: {}", e))
        }
        // The failure body carries the raw reply for the caller to inspect.
        VisionError::Malformed(failure) => {
            log::warn!("unparseable model reply: {}", failure.parse_error);
            (StatusCode::BAD_GATEWAY, Json(failure)).into_response()
        }
    }
}

async fn analyze_fridge_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let image = match read_image_field(multipart).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    log::info!("Analyzing fridge photo ({} bytes)", image.len());

    match fridge::analyze(state.vision.as_ref(), &image).await {
        Ok(analysis) => {
            let (analysis_id, analysis) = state.analyses.insert(analysis);
            Json(AnalyzeResponse {
                analysis_id,
                analysis: (*analysis).clone(),
            })
            .into_response()
        }
        Err(e) => vision_error_response(e),
    }
}

async fn gaps_handler(State(state): State<AppState>, Query(query): Query<GapsQuery>) -> Response {
    if let Err(e) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let Some(analysis) = state.analyses.get(query.analysis_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Upload a fridge photo first!");
    };

    match calculate_gaps(&query.recipe_name, &analysis) {
        Ok(report) => Json(report).into_response(),
        Err(GapsError::RecipeNotFound) => {
            error_response(StatusCode::NOT_FOUND, "Recipe not found")
        }
    }
}

async fn analyze_dish_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let image = match read_image_field(multipart).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    log::info!("Analyzing dish photo ({} bytes)", image.len());

    match dish::analyze(state.vision.as_ref(), &image).await {
        Ok(mut analysis) => {
            analysis.shopping_list = state.prices.shopping_list(&analysis.ingredients).await;
            Json(analysis).into_response()
        }
        Err(e) => vision_error_response(e),
    }
}

async fn alternatives_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let image = match read_image_field(multipart).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    match alternatives::analyze(state.vision.as_ref(), &image).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => vision_error_response(e),
    }
}
