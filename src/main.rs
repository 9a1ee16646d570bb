use std::fs;
use std::io::{self, Read, Write};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use console::{style, Term};
use indicatif::ProgressBar;
use log::debug;
use serde_json::Value as JsonValue;

use wktjson::{parse_with, to_ewkt_value, to_wkt_value, ParseOptions};

/// Collect the geometry objects of a top-level GeoJSON item
///
/// Walks `serde_json::Value` rather than `geojson::GeoJson`, which would reject
/// unknown geometry types before they reach the empty-WKT fallback.
fn geometries(json: &JsonValue) -> Vec<&JsonValue> {
    match json.get("type").and_then(JsonValue::as_str) {
        Some("FeatureCollection") => json
            .get("features")
            .and_then(JsonValue::as_array)
            .map(|features| features.iter().filter_map(feature_geometry).collect())
            .unwrap_or_default(),
        Some("Feature") => feature_geometry(json).into_iter().collect(),
        _ => vec![json],
    }
}

fn feature_geometry(feature: &JsonValue) -> Option<&JsonValue> {
    feature.get("geometry").filter(|geometry| !geometry.is_null())
}

/// Read a file path, or stdin for '-' or no path
fn read_input(path: Option<&str>) -> Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Reading input");
    spinner.enable_steady_tick(100);

    let mut input = String::new();
    match path {
        None | Some("-") => {
            io::stdin()
                .read_to_string(&mut input)
                .context("There was an error reading from stdin")?;
        }
        Some(path) => {
            input = fs::read_to_string(path)
                .with_context(|| format!("There was an error reading {}", path))?;
        }
    };

    spinner.finish_and_clear();
    Ok(input)
}

fn to_geojson_command(matches: &ArgMatches) -> Result<String> {
    let input = read_input(matches.value_of("INPUT"))?;
    let options = ParseOptions {
        strict: matches.is_present("strict"),
    };
    debug!("parsing WKT with {:?}", options);

    let geometry = parse_with(&input, options).context("Could not parse WKT")?;
    let output = if matches.is_present("pretty") {
        serde_json::to_string_pretty(&geometry)?
    } else {
        serde_json::to_string(&geometry)?
    };
    Ok(output)
}

fn to_wkt_command(matches: &ArgMatches) -> Result<String> {
    let input = read_input(matches.value_of("INPUT"))?;
    let json: JsonValue = serde_json::from_str(&input).context("Could not parse GeoJSON")?;
    let write = if matches.is_present("ewkt") {
        to_ewkt_value
    } else {
        to_wkt_value
    };

    let lines = geometries(&json)
        .into_iter()
        .map(write)
        .collect::<Result<Vec<_>, _>>()
        .context("Could not write WKT")?;
    debug!("wrote {} geometries", lines.len());
    Ok(lines.join("\n"))
}

fn app() -> App<'static, 'static> {
    let input = Arg::with_name("INPUT")
        .help("File to read, or '-' to read stdin (the default)")
        .index(1);

    App::new("wktjson")
        .version(crate_version!())
        .about("Convert geometries between WKT and GeoJSON")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("to-geojson")
                .about("Read WKT, optionally prefixed with SRID=<code>;, and print GeoJSON")
                .arg(input.clone())
                .arg(
                    Arg::with_name("strict")
                        .long("strict")
                        .help("Fail on coordinates that are not numbers"),
                )
                .arg(
                    Arg::with_name("pretty")
                        .long("pretty")
                        .help("Indent the GeoJSON output"),
                ),
        )
        .subcommand(
            SubCommand::with_name("to-wkt")
                .about("Read a GeoJSON geometry, Feature or FeatureCollection and print WKT")
                .arg(input)
                .arg(
                    Arg::with_name("ewkt")
                        .long("ewkt")
                        .help("Prefix output with SRID=<code>; when the geometry has a projection"),
                ),
        )
}

fn run() -> Result<()> {
    let matches = app().get_matches();
    let output = match matches.subcommand() {
        ("to-geojson", Some(sub)) => to_geojson_command(sub)?,
        ("to-wkt", Some(sub)) => to_wkt_command(sub)?,
        (name, _) => bail!("Unknown command {}", name),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output)?;
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        let message = format!("{} {:#}", style("error:").red().bold(), err);
        if Term::stderr().write_line(&message).is_err() {
            eprintln!("{}", message);
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn feature_collection_geometries() {
        let json = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "geometry": null},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[1, 2], [3, 4]]}}
            ]
        });
        let found = geometries(&json);
        assert_eq!(found.len(), 2);
        assert_eq!(to_wkt_value(found[1]).unwrap(), "LINESTRING(1 2, 3 4)");
    }

    #[test]
    fn bare_geometry() {
        let json = json!({"type": "Point", "coordinates": [1, 2]});
        assert_eq!(geometries(&json), vec![&json]);
    }

    #[test]
    fn feature_collection_with_unknown_and_3d_geometries() {
        let json = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "CircularString", "coordinates": []}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2, 30]}}
            ]
        });
        let lines = geometries(&json)
            .into_iter()
            .map(to_wkt_value)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(lines, vec!["".to_string(), "POINT(1 2)".to_string()]);
    }

    #[test]
    fn feature_without_geometry() {
        let json = json!({"type": "Feature", "geometry": null, "properties": {}});
        assert!(geometries(&json).is_empty());
    }

    #[test]
    fn cli_arguments() {
        let matches = app()
            .get_matches_from_safe(vec!["wktjson", "to-geojson", "--strict", "input.wkt"])
            .unwrap();
        let (name, sub) = matches.subcommand();
        assert_eq!(name, "to-geojson");
        let sub = sub.unwrap();
        assert!(sub.is_present("strict"));
        assert!(!sub.is_present("pretty"));
        assert_eq!(sub.value_of("INPUT"), Some("input.wkt"));

        assert!(app()
            .get_matches_from_safe(vec!["wktjson", "to-wkt", "--strict"])
            .is_err());
    }
}
