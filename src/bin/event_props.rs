// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Event property test tool: prints the matched event properties of Home-Assistant states.

use clap::{Arg, ArgAction, Command};
use ha_event_props::configuration::{DEF_CONFIG_FILE, Settings, get_configuration};
use ha_event_props::{APP_VERSION, Property, PropertyType, State, get_properties};
use log::{info, warn};
use serde_json::{Value, json};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args = Command::new("event-props")
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Show the event properties of Home Assistant entity states")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("beta")
                .long("beta")
                .action(ArgAction::SetTrue)
                .help("Enable beta features (overrides configuration file)"),
        )
        .arg(
            Arg::new("instance")
                .short('i')
                .long("instance")
                .help("Only show the given event instance"),
        )
        .arg(
            Arg::new("states")
                .required(true)
                .value_name("STATES")
                .help("JSON file with a state object or an array of states, `-` for stdin"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut cfg = load_cfg(args.get_one::<String>("config").map(|s| s.as_str()))?;
    if args.get_flag("beta") {
        cfg.beta = true;
    }
    if !cfg.beta {
        warn!("Beta features are disabled: no event properties will be matched");
    }

    let states = read_states(args.get_one::<String>("states").expect("required argument"))?;
    let instance = args.get_one::<String>("instance").map(|s| s.as_str());

    let mut output = serde_json::Map::with_capacity(states.len());
    for state in states {
        let props = get_properties(&state, &cfg, PropertyType::Event, instance);
        let mut entries = Vec::with_capacity(props.len());
        for prop in props {
            entries.push(json!({
                "description": prop.description(),
                "state": prop.get_state()?,
            }));
        }
        output.insert(state.entity_id, Value::Array(entries));
    }

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn load_cfg(filename: Option<&str>) -> anyhow::Result<Settings> {
    let filename = match filename {
        None if Path::new(DEF_CONFIG_FILE).exists() => {
            info!("Loading default configuration file: {}", DEF_CONFIG_FILE);
            Some(DEF_CONFIG_FILE)
        }
        f => f,
    };
    Ok(get_configuration(filename)?)
}

fn read_states(source: &str) -> anyhow::Result<Vec<State>> {
    let data = if source == "-" {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        data
    } else {
        fs::read_to_string(source)?
    };

    let value: Value = serde_json::from_str(&data)?;
    let states = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        _ => vec![serde_json::from_value(value)?],
    };
    Ok(states)
}
