//! Agregador de la misión
//!
//! Porcentajes y conteos derivados de los reportes cargados. Todo
//! denominador cero da 0, nunca un error.

use std::collections::HashMap;

use crate::models::analytics::{
    CpoPerformance, FailureReasonCount, MissionOverview, MissionReview, OutcomeMarker,
};
use crate::models::mission::{MissionOutcome, Strategy};
use crate::models::route::{available_days, DayFilter, ReportRow};

/// Porcentaje entero de avance: `floor(filtered_max / global_max * 100)`
pub fn completion_rate(filtered_max: u32, global_max: u32) -> u32 {
    if global_max == 0 {
        return 0;
    }
    (u64::from(filtered_max) * 100 / u64::from(global_max)) as u32
}

/// Cobertura de operadores: `local / reference * 100`
pub fn cpo_coverage(local_distinct: usize, reference_distinct: usize) -> f64 {
    percentage(local_distinct, reference_distinct)
}

/// Tasa de éxito sobre los resultados dados
pub fn success_rate(outcomes: &[&MissionOutcome]) -> f64 {
    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    percentage(successes, outcomes.len())
}

pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Máximo de la columna de objetivos acumulados (el reporte ya guarda totales corridos)
pub fn max_cumulative<'a>(rows: impl IntoIterator<Item = &'a ReportRow>) -> u32 {
    rows.into_iter()
        .filter_map(|row| row.cumulative_targets)
        .max()
        .unwrap_or(0)
}

/// Cabecera de progreso del reporte bajo un filtro de día
pub fn mission_overview(
    title: String,
    hotel_name: String,
    report: &[ReportRow],
    filter: DayFilter,
    map_station_count: usize,
) -> MissionOverview {
    let filtered = filter.apply(report);
    let total_targets = max_cumulative(report);
    let tested_targets = max_cumulative(filtered.iter().copied());

    MissionOverview {
        title,
        hotel_name,
        day_filter: filter.to_string(),
        available_days: available_days(report),
        total_days: report.iter().map(|row| row.day).max().unwrap_or(0),
        total_targets,
        tested_targets,
        completion_rate: completion_rate(tested_targets, total_targets),
        map_station_count,
    }
}

/// Distinct count de operadores
pub fn distinct_operators<'a>(names: impl IntoIterator<Item = &'a str>) -> usize {
    let mut seen: Vec<&str> = names.into_iter().collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Resumen por operador, de menor a mayor tasa de éxito
pub fn cpo_performance(outcomes: &[&MissionOutcome]) -> Vec<CpoPerformance> {
    let mut grouped: HashMap<&str, (usize, usize)> = HashMap::new();
    for outcome in outcomes {
        let entry = grouped.entry(outcome.operator_name.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if outcome.is_success() {
            entry.1 += 1;
        }
    }

    let mut summary: Vec<CpoPerformance> = grouped
        .into_iter()
        .map(|(operator, (tests, successes))| CpoPerformance {
            operator_name: operator.to_string(),
            tests,
            successes,
            failures: tests - successes,
            success_rate: percentage(successes, tests),
        })
        .collect();

    summary.sort_by(|a, b| {
        a.success_rate
            .total_cmp(&b.success_rate)
            .then_with(|| a.operator_name.cmp(&b.operator_name))
    });
    summary
}

/// Distribución de motivos de fallo (sólo filas "失败"), de mayor a menor
pub fn failure_reasons(outcomes: &[&MissionOutcome]) -> Vec<FailureReasonCount> {
    let mut counts: Vec<FailureReasonCount> = Vec::new();
    for outcome in outcomes.iter().filter(|o| o.is_failure()) {
        let Some(reason) = outcome.failure_reason.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|c| c.reason == reason) {
            Some(count) => count.count += 1,
            None => counts.push(FailureReasonCount {
                reason: reason.to_string(),
                count: 1,
            }),
        }
    }
    // sort estable: empates en orden de aparición
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn marker(outcome: &MissionOutcome) -> OutcomeMarker {
    OutcomeMarker {
        station_name: outcome.station_name.clone(),
        operator_name: outcome.operator_name.clone(),
        status: outcome.status.clone(),
        failure_reason: outcome.failure_reason.clone(),
        latitude: outcome.latitude,
        longitude: outcome.longitude,
    }
}

/// Revisión completa de una estrategia; `None` si no hay datos para ella
pub fn mission_review(
    strategy: Strategy,
    hotel_name: String,
    outcomes: &[MissionOutcome],
    simulation_log: &[ReportRow],
) -> Option<MissionReview> {
    let selected: Vec<&MissionOutcome> = outcomes.iter().filter(|o| o.belongs_to(strategy)).collect();
    if selected.is_empty() {
        return None;
    }

    let total_tests = selected.len();
    let success_count = selected.iter().filter(|o| o.is_success()).count();
    let failure_reasons = failure_reasons(&selected);
    let has_failures = selected.iter().any(|o| o.is_failure());

    Some(MissionReview {
        strategy: strategy.display_name().to_string(),
        hotel_name,
        total_tests,
        success_count,
        failure_count: total_tests - success_count,
        success_rate: success_rate(&selected),
        total_days: simulation_log.iter().map(|row| row.day).max(),
        tested_cpos: distinct_operators(selected.iter().map(|o| o.operator_name.as_str())),
        perfect_mission: !has_failures,
        failure_reasons,
        cpo_performance: cpo_performance(&selected),
        success_layer: selected.iter().filter(|o| o.is_success()).map(|o| marker(o)).collect(),
        failure_layer: selected.iter().filter(|o| !o.is_success()).map(|o| marker(o)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::route::fixtures::row;

    fn outcome(strategy: &str, operator: &str, status: &str, reason: Option<&str>) -> MissionOutcome {
        MissionOutcome {
            strategy: strategy.to_string(),
            station_name: format!("{} 站", operator),
            operator_name: operator.to_string(),
            status: status.to_string(),
            failure_reason: reason.map(str::to_string),
            latitude: 23.12,
            longitude: 113.32,
        }
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(40, 100), 40);
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(5, 0), 0);
        assert_eq!(completion_rate(2, 3), 66);
        assert_eq!(completion_rate(100, 100), 100);
    }

    #[test]
    fn test_zero_denominators() {
        assert_eq!(cpo_coverage(3, 0), 0.0);
        assert_eq!(success_rate(&[]), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert!(cpo_performance(&[]).is_empty());
    }

    #[test]
    fn test_cpo_coverage() {
        assert_eq!(cpo_coverage(9, 36), 25.0);
        assert_eq!(cpo_coverage(36, 36), 100.0);
    }

    #[test]
    fn test_success_rate() {
        let outcomes = vec![
            outcome("A", "国家电网", "成功", None),
            outcome("A", "国家电网", "失败", Some("桩端问题")),
            outcome("A", "特来电", "成功", None),
            outcome("A", "特来电", "成功", None),
        ];
        let refs: Vec<&MissionOutcome> = outcomes.iter().collect();
        assert_eq!(success_rate(&refs), 75.0);
    }

    #[test]
    fn test_overview_uses_cumulative_max() {
        let report = vec![
            row(1, 10, "H", "S1"),
            row(1, 40, "S1", "S2"),
            row(2, 70, "S2", "S3"),
            row(3, 100, "S3", "S4"),
        ];

        let all = mission_overview("t".into(), "h".into(), &report, DayFilter::All, 0);
        assert_eq!(all.total_targets, 100);
        assert_eq!(all.tested_targets, 100);
        assert_eq!(all.completion_rate, 100);
        assert_eq!(all.total_days, 3);

        let day_one = mission_overview("t".into(), "h".into(), &report, DayFilter::Day(1), 0);
        assert_eq!(day_one.tested_targets, 40);
        assert_eq!(day_one.completion_rate, 40);
        assert_eq!(day_one.day_filter, "1");

        let empty = mission_overview("t".into(), "h".into(), &report, DayFilter::Day(9), 0);
        assert_eq!(empty.tested_targets, 0);
        assert_eq!(empty.completion_rate, 0);
    }

    #[test]
    fn test_cpo_performance_sorted_ascending() {
        let outcomes = vec![
            outcome("B", "国家电网", "成功", None),
            outcome("B", "国家电网", "失败", Some("车端问题")),
            outcome("B", "特来电", "成功", None),
            outcome("B", "星星充电", "失败", Some("桩端问题")),
        ];
        let refs: Vec<&MissionOutcome> = outcomes.iter().collect();
        let summary = cpo_performance(&refs);

        let names: Vec<&str> = summary.iter().map(|s| s.operator_name.as_str()).collect();
        assert_eq!(names, vec!["星星充电", "国家电网", "特来电"]);
        assert_eq!(summary[1].tests, 2);
        assert_eq!(summary[1].failures, 1);
        assert_eq!(summary[1].success_rate, 50.0);
    }

    #[test]
    fn test_failure_reasons_and_review() {
        let outcomes = vec![
            outcome("A", "国家电网", "失败", Some("桩端问题")),
            outcome("B", "国家电网", "失败", Some("车端问题")),
            outcome("B", "特来电", "失败", Some("桩端问题")),
            outcome("B", "星星充电", "失败", Some("桩端问题")),
            outcome("B", "星星充电", "成功", None),
        ];
        let log = vec![row(1, 2, "H", "S1"), row(4, 5, "S1", "S2")];

        let review = mission_review(Strategy::B, "W".into(), &outcomes, &log).unwrap();
        assert_eq!(review.total_tests, 4);
        assert_eq!(review.success_count, 1);
        assert_eq!(review.failure_count, 3);
        assert_eq!(review.success_rate, 25.0);
        assert_eq!(review.total_days, Some(4));
        assert_eq!(review.tested_cpos, 3);
        assert!(!review.perfect_mission);
        assert_eq!(
            review.failure_reasons,
            vec![
                FailureReasonCount { reason: "桩端问题".into(), count: 2 },
                FailureReasonCount { reason: "车端问题".into(), count: 1 },
            ]
        );
        assert_eq!(review.success_layer.len(), 1);
        assert_eq!(review.failure_layer.len(), 3);
    }

    #[test]
    fn test_review_of_strategy_without_data() {
        let outcomes = vec![outcome("A", "国家电网", "成功", None)];
        assert!(mission_review(Strategy::B, "W".into(), &outcomes, &[]).is_none());

        let review = mission_review(Strategy::A, "W".into(), &outcomes, &[]).unwrap();
        assert!(review.perfect_mission);
        assert_eq!(review.total_days, None);
    }
}
