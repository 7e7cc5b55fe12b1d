use serde::Serialize;
use transit_core::route::Route;
use transit_core::stop::Stop;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{cell:w$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", render(&header));
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));
    for row in &rows {
        println!("{}", render(row));
    }
}

fn coord(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_stops(stops: &[Stop]) {
    let rows = stops
        .iter()
        .map(|s| {
            vec![
                s.stop_id.clone(),
                s.stop_name.clone(),
                s.location.clone(),
                coord(s.latitude),
                coord(s.longitude),
            ]
        })
        .collect();
    print_table(&["STOP_ID", "NAME", "LOCATION", "LAT", "LON"], rows);
}

pub fn print_route(route: &Route) {
    println!("Route: {} ({})", route.route_name, route.route_id);
    println!("Stops: {}", route.stops.len());
    if route.stops.is_empty() {
        println!("  (none)");
        return;
    }
    for (i, stop) in route.stops.iter().enumerate() {
        if stop.location.is_empty() {
            println!("  {i}. {}", stop.stop_name);
        } else {
            println!("  {i}. {} ({})", stop.stop_name, stop.location);
        }
    }
}
