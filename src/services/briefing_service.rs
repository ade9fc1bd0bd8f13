//! Briefing de la misión
//!
//! Clasificación de las estaciones objetivo por tipo de marca, distribución
//! de potencia y cobertura de operadores frente al censo nacional.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::models::analytics::{
    CategoryCount, CpoCoverage, MissionBriefing, OemStation, PowerTypeDistribution, StationMarker,
};
use crate::models::station::{BaseLocation, CpoCategory, NationalStation, PowerType, Station};
use crate::services::mission_aggregator::{cpo_coverage, distinct_operators, percentage};

lazy_static! {
    static ref PRIMARY_CPOS: HashSet<&'static str> = [
        "国家电网", "小桔充电", "南网电动", "蔚景云",
        "星星充电", "云快充", "依威能源", "特来电", "逸安启",
    ]
    .into_iter()
    .collect();

    static ref FRIENDLY_OEM_BRANDS: HashSet<&'static str> = [
        "比亚迪", "小米", "蔚来", "理想", "特斯拉", "小鹏", "广汽", "路特斯",
    ]
    .into_iter()
    .collect();
}

/// OEM si la marca es de un fabricante amigo, Primary si el operador es de
/// la lista principal, Local en cualquier otro caso
pub fn classify_cpo_category(station: &Station) -> CpoCategory {
    let friendly_brand = station
        .brand_keyword
        .as_deref()
        .map(|brand| FRIENDLY_OEM_BRANDS.contains(brand))
        .unwrap_or(false);

    if friendly_brand {
        CpoCategory::Oem
    } else if PRIMARY_CPOS.contains(station.operator_name.as_str()) {
        CpoCategory::Primary
    } else {
        CpoCategory::Local
    }
}

/// Conteo por categoría, de mayor a menor
pub fn category_counts(stations: &[Station]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for station in stations {
        let category = classify_cpo_category(station);
        match counts.iter_mut().find(|c| c.category == category) {
            Some(count) => count.count += 1,
            None => counts.push(CategoryCount { category, count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// AC/DC/Unknown; los porcentajes son sobre AC + DC
pub fn power_distribution(stations: &[Station]) -> PowerTypeDistribution {
    let count = |kind: PowerType| {
        stations
            .iter()
            .filter(|s| s.power_type_final.unwrap_or(PowerType::Unknown) == kind)
            .count()
    };
    let ac_count = count(PowerType::Ac);
    let dc_count = count(PowerType::Dc);
    let known = ac_count + dc_count;

    PowerTypeDistribution {
        dc_count,
        ac_count,
        unknown_count: count(PowerType::Unknown),
        dc_percentage: percentage(dc_count, known),
        ac_percentage: percentage(ac_count, known),
    }
}

/// Cobertura: ciudad frente a país, y plan frente a ciudad
pub fn coverage_analysis(plan: &[Station], national: &[NationalStation], city: &str) -> CpoCoverage {
    let plan_cpos = distinct_operators(plan.iter().map(|s| s.operator_name.as_str()));
    let national_cpos = distinct_operators(national.iter().map(|s| s.operator_name.as_str()));
    let city_cpos = distinct_operators(
        national
            .iter()
            .filter(|s| s.city.as_deref() == Some(city))
            .map(|s| s.operator_name.as_str()),
    );

    CpoCoverage {
        city: city.to_string(),
        city_cpos,
        national_cpos,
        plan_cpos,
        city_vs_national_percentage: cpo_coverage(city_cpos, national_cpos),
        plan_vs_city_percentage: cpo_coverage(plan_cpos, city_cpos),
    }
}

pub fn build_briefing(
    plan: &[Station],
    national: &[NationalStation],
    city: &str,
    estimated_days: u32,
    base: BaseLocation,
) -> MissionBriefing {
    let mut oem_brands: Vec<String> = Vec::new();
    let mut oem_stations = Vec::new();
    let mut markers = Vec::with_capacity(plan.len());

    for station in plan {
        let category = classify_cpo_category(station);
        if category == CpoCategory::Oem {
            let brand = station.brand_keyword.clone().unwrap_or_default();
            if !oem_brands.contains(&brand) {
                oem_brands.push(brand.clone());
            }
            oem_stations.push(OemStation {
                station_name: station.station_name.clone(),
                brand_keyword: brand,
                rating: station.rating,
            });
        }
        markers.push(StationMarker {
            station_name: station.station_name.clone(),
            operator_name: station.operator_name.clone(),
            category,
            latitude: station.latitude,
            longitude: station.longitude,
        });
    }

    tracing::info!(
        "🗺️ Briefing: {} objetivos, {} marcas OEM",
        plan.len(),
        oem_brands.len()
    );

    MissionBriefing {
        total_targets: plan.len(),
        estimated_days,
        coverage: coverage_analysis(plan, national, city),
        power_types: power_distribution(plan),
        categories: category_counts(plan),
        oem_brands,
        oem_stations,
        markers,
        base,
    }
}
