use anyhow::Result;
use chrono::NaiveDateTime;
use mor_export_core::dates::DateWindow;
use mor_export_core::executor::QueryParam;
use mor_export_core::reports::provider_activity::escape_like;
use mor_export_core::reports::{
    write_report, DailyDestinationRow, DestinationPriceRow, DurationByLineType,
    IncomingCallsDuration, IncomingDurationRow, LineDurationRow, MaxCallsPerDayByDestination,
    PricesByDestination, ProviderActivity, ProviderActivityRow, Report,
};
use mor_export_core::ExportError;

fn window() -> DateWindow {
    DateWindow::parse("2024-01-01 00:00:00", "2024-01-31 23:59:59").expect("window")
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").expect("timestamp")
}

#[test]
fn queries_bind_the_window_instead_of_inlining_it() {
    let window = window();
    let specs = [
        IncomingCallsDuration.query(&window),
        DurationByLineType.query(&window),
        PricesByDestination::default().query(&window),
        MaxCallsPerDayByDestination.query(&window),
        ProviderActivity::new("sfr").query(&window),
    ];

    for spec in &specs {
        assert!(!spec.sql.contains("2024-01"), "literal date in {}", spec.sql);
        assert_eq!(spec.params[0], QueryParam::DateTime(window.start));
        assert_eq!(spec.params[1], QueryParam::DateTime(window.end));
        assert_eq!(
            spec.sql.matches('?').count(),
            spec.params.len(),
            "placeholder count for {}",
            spec.sql
        );
    }
}

#[test]
fn provider_filter_is_bound_and_escaped() {
    let spec = ProviderActivity::new("50%_off").query(&window());
    assert_eq!(spec.params.len(), 3);
    assert_eq!(spec.params[2], QueryParam::Text("50!%!_off".into()));
    assert!(!spec.sql.contains("50%_off"));

    assert_eq!(escape_like("orange"), "orange");
    assert_eq!(escape_like("a!b"), "a!!b");
}

#[test]
fn price_query_lists_device_groups_and_providers() {
    let sql = PricesByDestination::default().query(&window()).sql;
    assert!(sql.contains("WHEN c.src_device_id IN (181,1081) THEN 'EN'"));
    assert!(sql.contains("WHEN c.src_device_id IN (671,1072) THEN 'FR'"));
    assert!(sql.contains("c.src_device_id IN (181,1081,671,1072)"));
    assert!(sql.contains("c.provider_id IN (561,721,21,31,101,111,441,711,781,801)"));
}

#[test]
fn incoming_duration_renders_blank_optionals_and_hours() -> Result<()> {
    let rows = vec![IncomingDurationRow {
        did: "33170000001".into(),
        seconds: 3661,
        provider: Some("SFR".into()),
        username: None,
        extension: Some("201".into()),
        description: None,
        status: "active".into(),
        update_date: None,
    }];

    let lines = IncomingCallsDuration.render(rows)?;
    assert_eq!(
        lines,
        vec![vec![
            "33170000001",
            "3661",
            "SFR",
            "",
            "201",
            "",
            "active",
            "",
            "1 h 1 m"
        ]]
    );
    assert_eq!(lines[0].len(), IncomingCallsDuration.header().len());
    Ok(())
}

#[test]
fn provider_activity_renders_counts_in_header_order() -> Result<()> {
    let report = ProviderActivity::new("sfr");
    let lines = report.render(vec![ProviderActivityRow {
        did: "33170000002".into(),
        incoming_calls: 4,
        incoming_duration: 250,
        last_incoming: Some("2024-01-30 10:00:00".into()),
        outgoing_calls: 0,
        outgoing_duration: 0,
        last_outgoing: None,
        provider: "SFR Business".into(),
    }])?;

    assert_eq!(
        lines[0],
        vec![
            "33170000002",
            "4",
            "250",
            "2024-01-30 10:00:00",
            "0",
            "0",
            "",
            "SFR Business"
        ]
    );
    assert_eq!(lines[0].len(), report.header().len());
    Ok(())
}

#[test]
fn line_type_report_labels_mobiles_and_keeps_unknowns() -> Result<()> {
    let lines = DurationByLineType.render(vec![
        LineDurationRow {
            destination: "0612345678".into(),
            duration: 90,
        },
        LineDurationRow {
            destination: "notanumber".into(),
            duration: 30,
        },
    ])?;

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], vec!["FR_MOBILE", "+33612345678", "90", "0 h 1 m"]);
    assert_eq!(lines[1][0], "UNKNOWN");
    assert_eq!(lines[1][2], "30");
    Ok(())
}

#[test]
fn price_report_resolves_country_and_average() -> Result<()> {
    let lines = PricesByDestination::default().render(vec![
        DestinationPriceRow {
            device_group: "FR".into(),
            destination: "France Mobile".into(),
            prefix: "33612".into(),
            price: "12,50".into(),
            duration: 5,
        },
        DestinationPriceRow {
            device_group: "EN".into(),
            destination: "Satellite".into(),
            prefix: "".into(),
            price: "0,00".into(),
            duration: 0,
        },
    ])?;

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][0], "FR");
    assert_eq!(lines[0][1], "France");
    assert_eq!(lines[0][2], "France Mobile");
    assert_eq!(&lines[0][4..], ["12,50", "5", "0 h 5 m", "2.5"]);

    assert_eq!(lines[1][1], "UNKNOWN");
    assert_eq!(lines[1][3], "UNKNOWN");
    assert_eq!(lines[1][7], "0");
    Ok(())
}

#[test]
fn price_report_fails_on_unparseable_price() {
    let result = PricesByDestination::default().render(vec![DestinationPriceRow {
        device_group: "FR".into(),
        destination: "France".into(),
        prefix: "33".into(),
        price: "twelve".into(),
        duration: 5,
    }]);
    assert!(matches!(result, Err(ExportError::InvalidPrice { .. })));
}

#[test]
fn daily_report_folds_destinations_into_countries() -> Result<()> {
    let row = |day: &str, destination: &str, prefix: &str, calls: i64| DailyDestinationRow {
        day: day.into(),
        destination: destination.into(),
        prefix: prefix.into(),
        calls,
    };
    let lines = MaxCallsPerDayByDestination.render(vec![
        row("2024-01-01", "France Mobile", "33612", 3),
        row("2024-01-01", "France Fixed", "33145", 5),
        row("2024-01-01", "Satellite", "", 2),
        row("2024-01-02", "France Mobile", "33612", 1),
    ])?;

    assert_eq!(
        lines,
        vec![
            vec!["2024-01-01", "France", "8"],
            vec!["2024-01-01", "UNKNOWN", "2"],
            vec!["2024-01-02", "France", "1"],
        ]
    );
    Ok(())
}

#[test]
fn daily_report_groups_calling_code_prefixes_with_full_prefixes() -> Result<()> {
    let row = |destination: &str, prefix: &str, calls: i64| DailyDestinationRow {
        day: "2024-01-01".into(),
        destination: destination.into(),
        prefix: prefix.into(),
        calls,
    };
    let lines = MaxCallsPerDayByDestination.render(vec![
        row("France", "33", 4),
        row("Russia Moscow", "7495", 3),
        row("Russia", "7", 2),
        row("UK", "44", 1),
        row("UK London", "4420", 6),
    ])?;

    assert_eq!(
        lines,
        vec![
            vec!["2024-01-01", "France", "4"],
            vec!["2024-01-01", "Russia", "5"],
            vec!["2024-01-01", "United Kingdom", "7"],
        ]
    );
    Ok(())
}

#[test]
fn price_report_names_calling_code_prefixes() -> Result<()> {
    let lines = PricesByDestination::default().render(vec![DestinationPriceRow {
        device_group: "EN".into(),
        destination: "UK".into(),
        prefix: "44".into(),
        price: "3,00".into(),
        duration: 6,
    }])?;

    assert_eq!(lines[0][1], "United Kingdom");
    assert_eq!(lines[0][3], "+44");
    assert_eq!(lines[0][7], "0.5");
    Ok(())
}

#[test]
fn written_report_has_header_and_semicolon_lines() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_report(
        &DurationByLineType,
        vec![LineDurationRow {
            destination: "+33612345678".into(),
            duration: 7200,
        }],
        dir.path(),
        at("2024-02-01 08:30:05"),
    )?;

    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("2024_02_01_08_30_05_export.csv")
    );
    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(
        contents,
        "Country;Destination;Duration;Duration (hours)\nFR_MOBILE;+33612345678;7200;2 h 0 m\n"
    );
    Ok(())
}

#[test]
fn empty_result_still_writes_the_header() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_report(
        &MaxCallsPerDayByDestination,
        Vec::new(),
        dir.path(),
        at("2024-02-01 08:30:05"),
    )?;

    assert_eq!(std::fs::read_to_string(path)?, "Day;Country;Calls\n");
    Ok(())
}

#[test]
fn failed_render_leaves_no_file_behind() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let result = write_report(
        &PricesByDestination::default(),
        vec![DestinationPriceRow {
            device_group: "FR".into(),
            destination: "France".into(),
            prefix: "33".into(),
            price: "twelve".into(),
            duration: 5,
        }],
        dir.path(),
        at("2024-02-01 08:30:05"),
    );

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}
