use crate::actix_web::dev::Payload;
use crate::actix_web::http::header;
use crate::actix_web::web::Data;
use crate::actix_web::{FromRequest, HttpRequest};
use crate::config::Config;
use crate::error::Error;
use crate::sha2::{Digest, Sha256};
use std::future::{ready, Ready};
use std::net::{IpAddr, SocketAddr};

/// Proof that the request carried the configured admin bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

impl FromRequest for AdminToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let config = match req.app_data::<Data<Config>>() {
            Some(config) => config,
            None => return ready(Err(Error::ServerError("configuration is not registered".into()))),
        };
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        match token {
            Some(token) if same_digest(token, &config.admin_token) => ready(Ok(AdminToken)),
            _ => {
                log::warn!("rejected admin request to {}", req.path());
                ready(Err(Error::Unauthorized))
            }
        }
    }
}

fn same_digest(a: &str, b: &str) -> bool {
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

/// Client address as reported by the proxy headers or the peer socket, without port.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl FromRequest for ClientIp {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let info = req.connection_info();
        ready(Ok(ClientIp(info.realip_remote_addr().map(strip_port).filter(|ip| !ip.is_empty()))))
    }
}

fn strip_port(addr: &str) -> String {
    let addr = addr.trim();
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.to_owned()
}
