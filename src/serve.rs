//! HTTP server for the dashboard
//!
//! `scoutviz serve` → loads measures, starts server, serves the page

use crate::dashboard::Dashboard;
use crate::error::Error;
use crate::table::{TableData, TableQuery};
use colored::Colorize;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Response produced by the router, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"data":null,"error":"serialization failed: {}"}}"#, e)
        });
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: "Not found".to_string(),
        }
    }
}

/// Start the dashboard server and handle requests until the process exits
pub fn start_dashboard_server(dashboard: &Dashboard, addr: &str) -> std::io::Result<()> {
    let server = Server::http(addr).map_err(|e| std::io::Error::other(e.to_string()))?;

    let url = format!("http://{}", addr);

    eprintln!("\n{}", "📊 scoutviz".green().bold());
    eprintln!("   Dashboard: {}", url);
    eprintln!("   Press Ctrl+C to stop\n");
    log::info!("Listening on {}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(dashboard, request) {
            log::error!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(dashboard: &Dashboard, mut request: Request) -> std::io::Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    log::debug!("{} {}", method, url);

    let mut body = String::new();
    if method == Method::Post {
        if let Err(e) = request.as_reader().read_to_string(&mut body) {
            let reply = Reply::json(400, &ApiResponse::failure(format!("Failed to read body: {}", e)));
            return respond(request, reply);
        }
    }

    let reply = route(dashboard, &method, &url, &body);
    respond(request, reply)
}

fn respond(request: Request, reply: Reply) -> std::io::Result<()> {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    request.respond(response)
}

/// Map a request to a reply. `url` may carry a query string.
pub fn route(dashboard: &Dashboard, method: &Method, url: &str, body: &str) -> Reply {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };

    match (method, path) {
        // Serve dashboard page
        (&Method::Get, "/") => match crate::page::render(dashboard) {
            Ok(html) => Reply::html(html),
            Err(e) => Reply::json(500, &ApiResponse::failure(e)),
        },

        // API: Page description
        (&Method::Get, "/api/layout") => {
            Reply::json(200, &ApiResponse::success(dashboard.layout()))
        }

        // API: Control changed (POST /api/update)
        (&Method::Post, "/api/update") => handle_update(dashboard, body),

        // API: One page of the data table
        (&Method::Get, "/api/table") => match parse_query(query) {
            Ok(pairs) => {
                let page = dashboard.table().query(&TableQuery::from_pairs(&pairs));
                Reply::json(200, &ApiResponse::success(page))
            }
            Err(e) => Reply::json(400, &ApiResponse::failure(format!("Invalid query: {}", e))),
        },

        // API: View-filtered summary records
        (&Method::Get, "/api/summary") => handle_summary(dashboard, query),

        // 404
        _ => Reply::not_found(),
    }
}

fn parse_query(query: &str) -> Result<Vec<(String, String)>, serde_urlencoded::de::Error> {
    serde_urlencoded::from_str(query)
}

#[derive(serde::Deserialize)]
struct UpdateRequest {
    input: String,
    value: String,
}

fn handle_update(dashboard: &Dashboard, body: &str) -> Reply {
    // Parse JSON body
    let req: UpdateRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Reply::json(400, &ApiResponse::failure(format!("Invalid JSON: {}", e))),
    };

    match dashboard.dispatch(&req.input, &req.value) {
        Ok(outputs) => Reply::json(200, &ApiResponse::success(outputs)),
        Err(e @ Error::UnknownComponent(_)) => Reply::json(400, &ApiResponse::failure(e)),
        Err(e) => {
            log::error!("Callback for {} failed: {}", req.input, e);
            Reply::json(500, &ApiResponse::failure(format!("Callback error: {}", e)))
        }
    }
}

fn handle_summary(dashboard: &Dashboard, query: &str) -> Reply {
    let pairs = match parse_query(query) {
        Ok(pairs) => pairs,
        Err(e) => return Reply::json(400, &ApiResponse::failure(format!("Invalid query: {}", e))),
    };
    let phase = pairs
        .iter()
        .find(|(k, _)| k == "phase")
        .map(|(_, v)| v.as_str())
        .unwrap_or("All");

    let records = dashboard
        .view(phase)
        .and_then(|view| TableData::from_dataframe(&view, view.height().max(1)))
        .map(|table| table.records());

    match records {
        Ok(records) => Reply::json(200, &ApiResponse::success(records)),
        Err(e) => Reply::json(500, &ApiResponse::failure(e)),
    }
}
