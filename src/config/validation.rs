//! Service indexing for the routing table.
//!
//! Normalizes the declared transport (blank means `http`) and indexes
//! services by name; when the config declares duplicate names, the last one
//! read wins, matching plain `HashMap` insertion semantics.

use std::collections::HashMap;

use crate::config::model::Service;

pub fn index_services(services: &[Service]) -> HashMap<String, Service> {
    let mut indexed = HashMap::with_capacity(services.len());
    for svc in services {
        let mut svc = svc.clone();
        if svc.transport.trim().is_empty() {
            svc.transport = "http".to_string();
        }
        indexed.insert(svc.name.clone(), svc);
    }
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_transport_normalizes_to_http() {
        let services = vec![Service {
            name: "svc".into(),
            proxy_url: "http://x".into(),
            timeout: String::new(),
            transport: "  ".into(),
        }];
        let indexed = index_services(&services);
        assert_eq!(indexed["svc"].transport, "http");
    }

    #[test]
    fn last_duplicate_wins() {
        let services = vec![
            Service { name: "svc".into(), proxy_url: "http://first".into(), timeout: String::new(), transport: String::new() },
            Service { name: "svc".into(), proxy_url: "http://second".into(), timeout: String::new(), transport: String::new() },
        ];
        let indexed = index_services(&services);
        assert_eq!(indexed["svc"].proxy_url, "http://second");
    }
}
