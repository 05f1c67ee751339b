#[macro_use]
extern crate log;

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use prometheus_exposition::{Format, MetricFamily, MetricType, Sample};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "example_hyper", about = "Serve a fixed metrics snapshot")]
struct Opt {
    /// HTTP listen address.
    #[structopt(
        short = "l",
        long,
        env = "EXPOSITION_LISTEN",
        default_value = "127.0.0.1:9898"
    )]
    listen: SocketAddr,

    /// Always answer with this format (text, protobuf, protobuf-text)
    /// instead of negotiating it from the Accept header.
    #[structopt(long)]
    format: Option<Format>,
}

fn snapshot() -> Vec<MetricFamily> {
    let requests = MetricFamily::new(
        "example_http_requests_total",
        "Number of HTTP requests made.",
        MetricType::Counter,
    )
    .with_sample(Sample::new("example_http_requests_total", 42.0).with_label("handler", "all"));

    let body_size = MetricFamily::new(
        "example_http_response_size_bytes",
        "The HTTP response sizes in bytes.",
        MetricType::Gauge,
    )
    .with_sample(Sample::new("example_http_response_size_bytes", 1024.0).with_label("handler", "all"));

    let latency = MetricFamily::new(
        "example_http_request_duration_seconds",
        "The HTTP request latencies in seconds.",
        MetricType::Histogram,
    )
    .with_sample(
        Sample::new("example_http_request_duration_seconds_bucket", 40.0)
            .with_label("handler", "all")
            .with_label("le", "0.1"),
    )
    .with_sample(
        Sample::new("example_http_request_duration_seconds_bucket", 42.0)
            .with_label("handler", "all")
            .with_label("le", "+Inf"),
    )
    .with_sample(
        Sample::new("example_http_request_duration_seconds_sum", 1.7).with_label("handler", "all"),
    )
    .with_sample(
        Sample::new("example_http_request_duration_seconds_count", 42.0)
            .with_label("handler", "all"),
    );

    vec![requests, body_size, latency]
}

async fn serve_req(
    req: Request<Body>,
    snapshot: Arc<Vec<MetricFamily>>,
    pinned: Option<Format>,
) -> Result<Response<Body>, hyper::Error> {
    let format = pinned.unwrap_or_else(|| {
        Format::from_accept(req.headers().get(ACCEPT).and_then(|v| v.to_str().ok()))
    });

    let response = match format.encode_to_vec(&snapshot) {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, format.content_type())
            .body(Body::from(body))
            .unwrap(),
        Err(e) => {
            error!("encoding metrics as {}: {}", format, e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::from(e.to_string()))
                .unwrap()
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let snapshot = Arc::new(snapshot());
    let pinned = opt.format;
    info!("Listening on http://{}", opt.listen);

    let make_svc = make_service_fn(move |_| {
        let snapshot = snapshot.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                serve_req(req, snapshot.clone(), pinned)
            }))
        }
    });

    if let Err(err) = Server::bind(&opt.listen).serve(make_svc).await {
        error!("server error: {}", err);
    }
}
