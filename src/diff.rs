use serde_json::Value;

use crate::state::EvolutionState;
use crate::types::*;

/// Leaf-level diff of two JSON documents, as `(path, old, new)` triples.
/// Keys missing from `current` are not reported.
pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None => {
                        if curr_val.is_object() {
                            diff_json(&Value::Object(serde_json::Map::new()), curr_val, &path, changes);
                        } else {
                            changes.push((path, Value::Null, curr_val.clone()));
                        }
                    }
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

/// Typed change events between two snapshots, ordered by system then zone.
pub fn diff_states(previous: &EvolutionState, current: &EvolutionState) -> Vec<Event> {
    let mut events = Vec::new();

    for (&system, sys) in &current.systems {
        let Some(prev_sys) = previous.systems.get(&system) else {
            events.push(Event::SystemAdded { system });
            for &zone in sys.zones.keys() {
                events.push(Event::ZoneAdded { system, zone });
            }
            continue;
        };

        if prev_sys.hvac_mode_raw != sys.hvac_mode_raw {
            events.push(Event::HvacModeChanged {
                system,
                raw: sys.hvac_mode_raw.clone(),
            });
        }
        if prev_sys.fan_mode != sys.fan_mode {
            events.push(Event::FanModeChanged {
                system,
                mode: sys.fan_mode.clone(),
            });
        }
        if prev_sys.is_active != sys.is_active {
            events.push(Event::ActiveChanged {
                system,
                active: sys.is_active,
            });
        }

        for (&zone, z) in &sys.zones {
            let Some(prev_z) = prev_sys.zones.get(&zone) else {
                events.push(Event::ZoneAdded { system, zone });
                continue;
            };
            if prev_z.current_temperature != z.current_temperature {
                events.push(Event::ZoneTemperatureChanged {
                    system,
                    zone,
                    temperature: z.current_temperature,
                });
            }
            if prev_z.heating_setpoint != z.heating_setpoint
                || prev_z.cooling_setpoint != z.cooling_setpoint
            {
                events.push(Event::ZoneSetpointsChanged {
                    system,
                    zone,
                    heat: z.heating_setpoint,
                    cool: z.cooling_setpoint,
                });
            }
        }
        for &zone in prev_sys.zones.keys() {
            if !sys.zones.contains_key(&zone) {
                events.push(Event::ZoneRemoved { system, zone });
            }
        }
    }

    for &system in previous.systems.keys() {
        if !current.systems.contains_key(&system) {
            events.push(Event::SystemRemoved { system });
        }
    }

    events
}
