//! Merging inferred ports with declared ports

use std::collections::HashSet;

use otelop_common::naming::fallback_port_name;
use otelop_common::ServicePortSpec;
use tracing::{debug, warn};

/// Combine the ports declared on the collector with the inferred ones
///
/// Declared ports come first and are never touched. Each inferred port, in
/// order, is dropped if its number is already taken; if only its name is
/// taken it is renamed `port-<number>`, and dropped if that name is taken
/// too. The result never repeats a number or a name.
pub fn merge_ports(
    declared: &[ServicePortSpec],
    inferred: impl IntoIterator<Item = ServicePortSpec>,
) -> Vec<ServicePortSpec> {
    let mut used_numbers: HashSet<u16> = declared.iter().map(|p| p.port).collect();
    let mut used_names: HashSet<String> = declared.iter().map(|p| p.name.clone()).collect();
    let mut merged = declared.to_vec();

    for mut port in inferred {
        if used_numbers.contains(&port.port) {
            debug!(name = %port.name, port = port.port, "port number already exposed, dropping");
            continue;
        }

        if used_names.contains(&port.name) {
            let fallback = fallback_port_name(port.port);
            if used_names.contains(&fallback) {
                warn!(
                    name = %port.name,
                    fallback = %fallback,
                    port = port.port,
                    "port name and fallback name already in use, dropping port"
                );
                continue;
            }
            debug!(name = %port.name, fallback = %fallback, "port name already in use, renaming");
            port.name = fallback;
        }

        used_numbers.insert(port.port);
        used_names.insert(port.name.clone());
        merged.push(port);
    }

    merged
}
