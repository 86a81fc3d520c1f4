//! Static lookup tables mapping the source site's numeric codes to the
//! normalized vocabulary. Every function is total: unrecognized codes fall
//! back to a defined value, never to an error or an absent one.

/// Source make code → normalized brand key.
pub fn map_brand(code: u32) -> &'static str {
    match code {
        9 => "audi",
        13 => "bmw",
        41 => "mini",
        47 => "mercedes",
        57 => "porsche",
        74 => "volkswagen",
        _ => "other",
    }
}

/// Normalized brand key → URL slug on the source site.
pub fn brand_slug(brand: &str) -> &'static str {
    match brand {
        "audi" => "audi",
        "bmw" => "bmw",
        "mercedes" => "mercedes-benz",
        "mini" => "mini",
        "porsche" => "porsche",
        "volkswagen" => "volkswagen",
        _ => "autres",
    }
}

/// Source body-type code → normalized category.
pub fn map_body_type(code: u32) -> &'static str {
    match code {
        1 => "berline",
        2 => "suv",
        3 => "break",
        4 => "coupe",
        5 => "cabriolet",
        6 => "citadine",
        7 => "monospace",
        _ => "other",
    }
}

/// Source transmission code → "automatic" | "manual".
pub fn map_transmission(code: u32) -> &'static str {
    match code {
        2 => "manual",
        _ => "automatic",
    }
}

/// Source fuel-category code → normalized fuel.
pub fn map_fuel(code: u32) -> &'static str {
    match code {
        1 => "essence",
        2 => "diesel",
        3 => "hybride",
        4 => "electrique",
        _ => "essence",
    }
}

/// Source color code → display color name.
pub fn map_color(code: u32) -> &'static str {
    match code {
        1 => "Noir",
        2 => "Blanc",
        3 => "Gris",
        4 => "Argent",
        5 => "Bleu",
        6 => "Rouge",
        7 => "Vert",
        8 => "Marron",
        9 => "Beige",
        _ => "Autre",
    }
}
