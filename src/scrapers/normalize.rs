use crate::models::{
    NormalizedVehicle, ParsedEquipment, RawSourceRecord, Specifications, DEFAULT_LOCATION,
    EXTERNAL_REF_PREFIX, SOURCE_PLATFORM,
};
use crate::scrapers::equipment::parse_equipment;
use crate::scrapers::mappers::{
    brand_slug, map_body_type, map_brand, map_color, map_fuel, map_transmission,
};
use crate::scrapers::traits::Clock;

/// Longest model-version text carried into the title verbatim.
const MAX_MODEL_VERSION_LEN: usize = 60;

/// Converts one raw source record into the canonical vehicle shape.
///
/// Pure and total: every optional field has a defined default, every coded
/// field passes through its mapping table, and the only time dependence
/// (the default-year fallback) comes from the injected clock. Calling this
/// twice on the same record with the same clock yields identical output.
pub fn normalize(raw: &RawSourceRecord, clock: &dyn Clock) -> NormalizedVehicle {
    let brand = map_brand(raw.make);
    let model = cleaned_model_version(raw)
        .unwrap_or_else(|| format!("Model {}", raw.model));
    let title = format!("{} {}", capitalize(brand), model);

    let mut parsed = raw
        .description
        .as_deref()
        .map(parse_equipment)
        .unwrap_or_default();
    if let Some(equipment) = raw.equipment.as_deref() {
        merge_equipment(&mut parsed, parse_equipment(equipment));
    }

    let specifications = build_specifications(raw, &parsed);

    NormalizedVehicle {
        external_id: raw.id.to_string(),
        external_reference: format!("{}-{}", EXTERNAL_REF_PREFIX, raw.id),
        title,
        brand: brand.to_string(),
        model,
        category: raw.body_type.map(map_body_type).unwrap_or("other").to_string(),
        price: raw.total_price.max(0.0),
        year: raw.first_registration_date.unwrap_or_else(|| clock.current_year()),
        mileage: raw.mileage.unwrap_or(0),
        fuel: raw.fuel_category.map(map_fuel).unwrap_or("essence").to_string(),
        transmission: raw
            .transmission_type
            .map(map_transmission)
            .unwrap_or("automatic")
            .to_string(),
        power: raw.hp.map(|hp| format!("{} ch", hp)),
        location: DEFAULT_LOCATION.to_string(),
        source_url: source_url(brand, raw.id),
        source_platform: SOURCE_PLATFORM.to_string(),
        specifications,
        features: parsed.features,
        packages: parsed.packages,
        doors: raw.doors,
        seats: raw.seats,
    }
}

/// Rebuilds the listing's detail URL from brand slug and id. The source
/// payload does not carry a stable detail URL, so it is derived instead.
fn source_url(brand: &str, id: u64) -> String {
    format!(
        "https://www.{}.de/fahrzeuge/{}?fahrzeug={}",
        SOURCE_PLATFORM,
        brand_slug(brand),
        id
    )
}

fn cleaned_model_version(raw: &RawSourceRecord) -> Option<String> {
    let version = raw.model_version_input.as_deref()?.trim();
    if version.is_empty() {
        return None;
    }
    Some(version.chars().take(MAX_MODEL_VERSION_LEN).collect())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn build_specifications(
    raw: &RawSourceRecord,
    parsed: &ParsedEquipment,
) -> Option<Specifications> {
    let specs = Specifications {
        engine: None,
        power: raw.hp.map(|hp| format!("{} ch", hp)),
        consumption: None,
        // Colors parsed out of the description win; coded colors fill in
        // when the text yields nothing.
        exterior_color: parsed
            .exterior_color
            .clone()
            .or_else(|| raw.exterior_color.map(|c| map_color(c).to_string())),
        interior_color: parsed
            .interior_color
            .clone()
            .or_else(|| raw.interior_color.map(|c| map_color(c).to_string())),
        upholstery: parsed.upholstery.clone(),
    };
    if specs.is_empty() {
        None
    } else {
        Some(specs)
    }
}

/// Appends the equipment-blob parse onto the description parse, keeping
/// first-seen order and dropping duplicates.
fn merge_equipment(into: &mut ParsedEquipment, extra: ParsedEquipment) {
    for feature in extra.features {
        if !into.features.contains(&feature) {
            into.features.push(feature);
        }
    }
    for package in extra.packages {
        if !into.packages.contains(&package) {
            into.packages.push(package);
        }
    }
    if into.exterior_color.is_none() {
        into.exterior_color = extra.exterior_color;
    }
    if into.interior_color.is_none() {
        into.interior_color = extra.interior_color;
        into.upholstery = extra.upholstery;
    }
}
