use std::path::PathBuf;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};

use clap::Parser;
use ngpred_core::NGramModel;
use serde::{Deserialize, Serialize};

/// Command-line options of the server.
#[derive(Parser)]
#[command(name = "ngpred-server")]
#[command(about = "HTTP front end for a trained backoff n-gram model")]
struct Args {
	/// Directory holding model.sda
	#[arg(short, long, default_value = "work")]
	work_dir: PathBuf,

	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(short, long, default_value_t = 5000)]
	port: u16,
}

/// Struct representing query parameters for the `/v1/predict` endpoint
#[derive(Deserialize)]
struct PredictParams {
	context: Option<String>,
	top_k: Option<usize>,
}

/// Body of the `/v1/predict_batch` endpoint
#[derive(Deserialize)]
struct BatchRequest {
	contexts: Vec<String>,
}

#[derive(Serialize)]
struct BatchResponse {
	predictions: Vec<String>,
}

struct SharedData {
	model: NGramModel,
	work_dir: PathBuf,
}

/// HTTP GET endpoint `/v1/predict`
///
/// Predicts the next characters of `context` (empty when omitted).
/// `top_k` defaults to the model's `default_top_k`.
#[get("/v1/predict")]
async fn get_predict(data: web::Data<RwLock<SharedData>>, query: web::Query<PredictParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let context = query.context.as_deref().unwrap_or("");
	let top_k = query.top_k.unwrap_or_else(|| shared_data.model.config().default_top_k());
	if top_k == 0 {
		return HttpResponse::BadRequest().body("top_k must be >= 1");
	}

	HttpResponse::Ok().body(shared_data.model.predict_next_chars(context, top_k))
}

/// HTTP POST endpoint `/v1/predict_batch`
///
/// One prediction per context, in request order. Runs on the blocking
/// pool: `run_pred` fans out over OS threads.
#[post("/v1/predict_batch")]
async fn post_predict_batch(data: web::Data<RwLock<SharedData>>, body: web::Json<BatchRequest>) -> impl Responder {
	let contexts = body.into_inner().contexts;
	let result = web::block(move || match data.read() {
		Ok(shared_data) => Ok(shared_data.model.run_pred(&contexts)),
		Err(_) => Err("Model lock failed"),
	})
	.await;

	match result {
		Ok(Ok(predictions)) => HttpResponse::Ok().json(BatchResponse { predictions }),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(e),
		Err(e) => HttpResponse::InternalServerError().body(format!("Batch prediction failed: {e}")),
	}
}

#[get("/v1/model")]
async fn get_model(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.model.summary())
}

/// HTTP PUT endpoint `/v1/reload`
///
/// Reloads `model.sda` from the work directory. On failure the current
/// model keeps serving. The file is read on the blocking pool; the write
/// lock is only held for the swap.
#[put("/v1/reload")]
async fn put_reload(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let work_dir = match data.read() {
		Ok(shared_data) => shared_data.work_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model = match web::block(move || NGramModel::load(work_dir)).await {
		Ok(Ok(model)) => model,
		Ok(Err(e)) => {
			log::error!("Reload failed: {e}");
			return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"));
		}
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	match data.write() {
		Ok(mut shared_data) => {
			shared_data.model = model;
			HttpResponse::Ok().body("Model reloaded successfully")
		}
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

/// Main entry point for the server.
///
/// Loads the model from the work directory, wraps it in a `RwLock` so
/// predictions run concurrently and reloads are exclusive, and starts an
/// Actix-web HTTP server.
///
/// A missing model is not fatal: the server starts untrained (empty
/// predictions) and can be filled later through `/v1/reload`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let model = match NGramModel::load(&args.work_dir) {
		Ok(model) => model,
		Err(e) => {
			log::warn!("Starting with an untrained model: {e}");
			NGramModel::default()
		}
	};

	let shared_data = SharedData { model, work_dir: args.work_dir };
	let shared_model = web::Data::new(RwLock::new(shared_data));

	log::info!("Listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_predict)
			.service(post_predict_batch)
			.service(get_model)
			.service(put_reload)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
