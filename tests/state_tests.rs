use bryant_evolution::{
    Error, EvolutionState, HvacAction, HvacMode, SystemState, TargetTemperatures, ZoneState,
};

fn zone(current: i32, heat: i32, cool: i32) -> ZoneState {
    ZoneState {
        current_temperature: current,
        heating_setpoint: heat,
        cooling_setpoint: cool,
    }
}

fn single(mode: &str, active: bool, z: ZoneState) -> EvolutionState {
    EvolutionState::new().with_system(1, SystemState::new("auto", mode, active).with_zone(1, z))
}

#[test]
fn current_temperature_is_stored_value() {
    let state = EvolutionState::new()
        .with_system(
            1,
            SystemState::new("auto", "HEAT", true)
                .with_zone(1, zone(71, 68, 74))
                .with_zone(2, zone(65, 68, 74)),
        )
        .with_system(2, SystemState::new("low", "COOL", false).with_zone(1, zone(79, 60, 76)));

    let expected = [((1, 1), 71), ((1, 2), 65), ((2, 1), 79)];
    for ((s, z), temp) in expected {
        assert_eq!(state.read_current_temperature(s, z).unwrap(), temp);
    }
    assert_eq!(state.read_fan_mode(2).unwrap(), "low");
}

#[test]
fn hvac_mode_any_case() {
    let cases = [
        ("heat", HvacMode::Heat),
        ("Heat", HvacMode::Heat),
        ("HEAT", HvacMode::Heat),
        ("cool", HvacMode::Cool),
        ("CoOl", HvacMode::Cool),
        ("auto", HvacMode::HeatCool),
        ("AUTO", HvacMode::HeatCool),
        ("off", HvacMode::Off),
        ("Off", HvacMode::Off),
    ];
    for (raw, mode) in cases {
        let state = single(raw, true, zone(70, 68, 72));
        assert_eq!(state.read_hvac_mode(1).unwrap(), mode, "raw {raw}");
    }
}

#[test]
fn hvac_mode_parse_error_carries_raw() {
    for raw in ["EHEAT", "heat_cool", "", " HEAT"] {
        let state = single(raw, true, zone(70, 68, 72));
        match state.read_hvac_mode(1) {
            Err(Error::InvalidMode(got)) => assert_eq!(got, raw),
            other => panic!("expected InvalidMode for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn target_temperatures_per_mode() {
    let heat = single("HEAT", true, zone(70, 68, 72));
    assert_eq!(
        heat.read_target_temperatures(1, 1).unwrap(),
        TargetTemperatures { target: Some(68), low: None, high: None }
    );

    let cool = single("COOL", true, zone(70, 65, 72));
    assert_eq!(
        cool.read_target_temperatures(1, 1).unwrap(),
        TargetTemperatures { target: Some(72), low: None, high: None }
    );

    let auto = single("AUTO", true, zone(70, 68, 76));
    assert_eq!(
        auto.read_target_temperatures(1, 1).unwrap(),
        TargetTemperatures { target: None, low: Some(68), high: Some(76) }
    );

    let off = single("OFF", true, zone(70, 68, 76));
    assert_eq!(
        off.read_target_temperatures(1, 1).unwrap(),
        TargetTemperatures::default()
    );
}

#[test]
fn inactive_is_off_regardless_of_mode() {
    for raw in ["HEAT", "COOL", "AUTO", "OFF"] {
        let state = single(raw, false, zone(90, 68, 72));
        assert_eq!(state.read_hvac_action(1, 1).unwrap(), HvacAction::Off, "mode {raw}");
    }
}

#[test]
fn active_action_follows_mode() {
    assert_eq!(
        single("HEAT", true, zone(60, 68, 72)).read_hvac_action(1, 1).unwrap(),
        HvacAction::Heating
    );
    assert_eq!(
        single("COOL", true, zone(80, 68, 72)).read_hvac_action(1, 1).unwrap(),
        HvacAction::Cooling
    );
}

#[test]
fn heat_cool_action_uses_cooling_setpoint() {
    assert_eq!(
        single("AUTO", true, zone(75, 68, 72)).read_hvac_action(1, 1).unwrap(),
        HvacAction::Cooling
    );
    assert_eq!(
        single("AUTO", true, zone(70, 68, 72)).read_hvac_action(1, 1).unwrap(),
        HvacAction::Heating
    );
}

#[test]
fn accessors_are_idempotent() {
    let state = single("AUTO", true, zone(74, 68, 72));
    let before = state.clone();
    for _ in 0..2 {
        assert_eq!(state.read_current_temperature(1, 1).unwrap(), 74);
        assert_eq!(state.read_fan_mode(1).unwrap(), "auto");
        assert_eq!(state.read_hvac_mode(1).unwrap(), HvacMode::HeatCool);
        assert_eq!(state.read_hvac_action(1, 1).unwrap(), HvacAction::Cooling);
        assert_eq!(state.zone_attributes(1, 1), state.zone_attributes(1, 1));
    }
    assert_eq!(state, before);
}

#[test]
fn end_to_end_from_json_snapshot() {
    let state: EvolutionState = serde_json::from_str(
        r#"{"systems": {"1": {
            "fan_mode": "auto",
            "hvac_mode_raw": "AUTO",
            "is_active": true,
            "zones": {"1": {"current_temperature": 80, "heating_setpoint": 68, "cooling_setpoint": 72}}
        }}}"#,
    )
    .unwrap();

    assert_eq!(state.read_hvac_mode(1).unwrap(), HvacMode::HeatCool);
    assert_eq!(
        state.read_target_temperatures(1, 1).unwrap(),
        TargetTemperatures { target: None, low: Some(68), high: Some(72) }
    );
    assert_eq!(state.read_hvac_action(1, 1).unwrap(), HvacAction::Cooling);

    let attrs = state.zone_attributes(1, 1);
    assert_eq!(attrs.current_temperature, Some(80));
    assert_eq!(attrs.hvac_action, Some(HvacAction::Cooling));
}

#[test]
fn missing_ids_are_lookup_errors() {
    let state = single("HEAT", true, zone(70, 68, 72));
    assert!(state.read_target_temperatures(3, 1).unwrap_err().is_lookup());
    assert!(state.read_target_temperatures(1, 3).unwrap_err().is_lookup());
    assert!(state.read_hvac_action(1, 3).unwrap_err().is_lookup());
    assert!(state.read_hvac_mode(3).unwrap_err().is_lookup());

    let attrs = state.zone_attributes(1, 3);
    assert_eq!(attrs.current_temperature, None);
    assert_eq!(attrs.hvac_mode, Some(HvacMode::Heat));
}
