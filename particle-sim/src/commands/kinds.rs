//! Emitter kind listing

use anyhow::Result;
use particle_fx::{EmitterConfig, EmitterKind, PoolPolicy, Space};

use crate::utils::{add_table_row, create_table};

pub fn execute() -> Result<()> {
    let mut table = create_table(&["Kind", "Pool", "Space"]);
    for kind in EmitterKind::ALL {
        add_table_row(&mut table, vec![kind.to_string(), describe_pool(kind), describe_space(kind)]);
    }
    table.printstd();
    Ok(())
}

fn describe_pool(kind: EmitterKind) -> String {
    match PoolPolicy::for_config(&EmitterConfig::new(kind)) {
        PoolPolicy::Replenish {
            capacity, prefill, ..
        } => {
            if prefill {
                format!("fixed {capacity}")
            } else {
                format!("fixed {capacity}, filled on first update")
            }
        }
        PoolPolicy::Interval { interval, batch } => format!("{batch} every {interval} s"),
    }
}

fn describe_space(kind: EmitterKind) -> String {
    match Space::for_kind(kind) {
        Space::Local => "local".to_string(),
        Space::World => "world".to_string(),
    }
}
