//! Closed option sets shown by the report sections

/// Building tenure (Section A)
pub const TENURE_OPTIONS: [&str; 5] = ["Propia", "Arrendamiento", "Comodato", "Usufructo", "Otro"];

/// Measure types (Section E); `Otra` requires a specification
pub const MEASURE_TYPES: [&str; 6] = [
    "Buenas prácticas operativas",
    "Medidas pasivas",
    "Reconversión tecnológica",
    "Sustitución de combustibles",
    "Implementación fuentes renovables de energía",
    OTHER_MEASURE,
];

/// Measure type that reveals `otherSpecification`
pub const OTHER_MEASURE: &str = "Otra";

/// Savings units (Section E)
pub const UNIT_OPTIONS: [&str; 9] = [
    "kWh/mes",
    "m3/mes",
    "J/mes",
    "kcal/mes",
    "kg/mes",
    "lb/mes",
    "toneladas/mes",
    "galón/mes",
    "litro/mes",
];

/// Route shown after Section A
pub const SECTION_B_ROUTE: &str = "/section-b";
