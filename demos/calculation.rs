use chrono::{TimeDelta, TimeZone};
use chrono_tz::America::Chicago;

use sunlight_tracker::{
    solar_midnight, solar_noon, solar_position, sunlight_changes, sunlight_level_at, SunlightError,
};

fn main() -> Result<(), SunlightError> {
    let latitude = 39.8;
    let longitude = -89.6;

    let dt = Chicago.with_ymd_and_hms(2026, 3, 21, 12, 0, 0).unwrap();

    let pos = solar_position(&dt, latitude, longitude)?;
    let level = sunlight_level_at(&dt, latitude, longitude)?;
    let noon = solar_noon(dt.date_naive(), &Chicago, longitude)?;
    let midnight = solar_midnight(dt.date_naive(), &Chicago, longitude)?;

    println!("=== Solar Position Calculation Example ===");
    println!(
        "Location: Springfield, IL ({:.1}°N, {:.1}°W)",
        latitude, -longitude
    );
    println!("Date/Time: {}", dt);
    println!();
    println!("--- Solar Position ---");
    println!("Declination: {:.2}°", pos.declination);
    println!("Elevation: {:.2}°", pos.elevation);
    println!("Azimuth: {:.2}° (0°=N, 90°=E, 180°=S)", pos.azimuth);
    println!("Sunlight level: {:?}", level);
    println!("Solar noon: {}", noon);
    println!("Solar midnight: {}", midnight);
    println!();
    println!("--- Sunlight Changes (next 24 h) ---");
    let end = dt.clone() + TimeDelta::days(1);
    for change in sunlight_changes(&dt, latitude, longitude)? {
        let change = change?;
        if *change.time() >= end {
            break;
        }
        println!(
            "{}  {:<17} {:?} -> {:?}",
            change.time().format("%Y-%m-%d %H:%M:%S %Z"),
            format!("{:?}", change.event()),
            change.previous_level(),
            change.new_level()
        );
    }
    Ok(())
}
