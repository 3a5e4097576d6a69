use std::rc::Rc;

use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use geo_types::Coord;
use serde::Deserialize;
use serde_json::json;

use crate::layers::crime_store::SqliteCrimeStore;
use crate::layers::error::Error;
use crate::layers::geo_util::BBox;
use crate::oracle::mapbox::MapboxDirections;
use crate::routing::config::RouterConfig;
use crate::routing::engine::RouteEngine;

use super::cors::cors_middleware;

pub struct AppState {
    pub engine: RouteEngine,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Coord<f64> {
        Coord { x: p.lng, y: p.lat }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub start: LatLng,
    pub end: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct BBoxQuery {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl From<BBoxQuery> for BBox {
    fn from(q: BBoxQuery) -> BBox {
        BBox {
            min_lat: q.min_lat,
            min_lng: q.min_lng,
            max_lat: q.max_lat,
            max_lng: q.max_lng,
        }
    }
}

fn error_response(err: &Error) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        Error::InvalidCoordinate { .. } => HttpResponse::BadRequest().json(body),
        Error::StoreUnavailable(_) => HttpResponse::ServiceUnavailable().json(body),
        Error::OracleUnavailable { .. } | Error::DegenerateRoute => {
            HttpResponse::BadGateway().json(body)
        }
    }
}

#[get("/")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok", "service": "safepath-route-service" }))
}

#[post("/route")]
async fn route(state: web::Data<AppState>, body: web::Json<RouteRequest>) -> HttpResponse {
    match state
        .engine
        .optimal_route(body.start.into(), body.end.into())
        .await
    {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(err) => {
            log::error!("route request failed: {err}");
            error_response(&err)
        }
    }
}

#[get("/heatmap")]
async fn heatmap(state: web::Data<AppState>, query: web::Query<BBoxQuery>) -> HttpResponse {
    match state
        .engine
        .crime_density_heatmap(query.into_inner().into())
        .await
    {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => {
            log::error!("heatmap request failed: {err}");
            error_response(&err)
        }
    }
}

#[get("/blocked-areas")]
async fn blocked_areas(state: web::Data<AppState>, query: web::Query<BBoxQuery>) -> HttpResponse {
    match state.engine.blocked_areas(query.into_inner().into()).await {
        Ok(areas) => HttpResponse::Ok().json(areas),
        Err(err) => {
            log::error!("blocked-areas request failed: {err}");
            error_response(&err)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CrimesQuery {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
    pub limit: Option<usize>,
}

impl CrimesQuery {
    fn bbox(&self) -> BBox {
        BBox {
            min_lat: self.min_lat,
            min_lng: self.min_lng,
            max_lat: self.max_lat,
            max_lng: self.max_lng,
        }
    }
}

/// Default cap on the incident listing.
const CRIMES_LIMIT: usize = 500;

#[get("/crimes")]
async fn crimes(state: web::Data<AppState>, query: web::Query<CrimesQuery>) -> HttpResponse {
    let query = query.into_inner();
    let limit = query.limit.unwrap_or(CRIMES_LIMIT);
    match state.engine.crimes_in_bbox(query.bbox()).await {
        Ok(mut list) => {
            let total = list.len();
            list.truncate(limit);
            HttpResponse::Ok().json(json!({
                "total": total,
                "crimes": list,
            }))
        }
        Err(err) => {
            log::error!("crimes request failed: {err}");
            error_response(&err)
        }
    }
}

/// Settings handed to every worker when building its engine.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub oracle_url: String,
    pub oracle_token: String,
}

pub async fn start_server(config: ServerConfig, host: &str, port: u16) -> std::io::Result<()> {
    log::info!("starting server on {host}:{port}");

    HttpServer::new(move || {
        // the oracle client is single-threaded; each worker builds its own
        // engine around its own client
        let router_config = RouterConfig::default();
        let store = Rc::new(SqliteCrimeStore::new(
            config.db_path.clone(),
            router_config.retention_days,
        ));
        let oracle = Rc::new(MapboxDirections::new(
            config.oracle_url.clone(),
            config.oracle_token.clone(),
        ));
        let state = AppState {
            engine: RouteEngine::new(store, oracle, router_config),
        };

        App::new()
            .wrap(cors_middleware())
            .app_data(web::Data::new(state))
            .service(health)
            .service(route)
            .service(heatmap)
            .service(blocked_areas)
            .service(crimes)
    })
    .bind((host, port))?
    .run()
    .await
}
