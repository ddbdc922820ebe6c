use ratatui::style::Color;
use tunedash::config::{AppConfig, Theme};

#[test]
fn test_indexed_colors_end_to_end() {
    // Clear NO_COLOR for this test
    std::env::remove_var("NO_COLOR");

    // Create config with indexed colors
    let config_toml = r#"
version = "0.3"

[theme.colors]
background = "black"
controls_bg = "indexed(236)"
text_primary = "white"
text_secondary = "dark_gray"
dimmed = "indexed(239)"
warning = "yellow"
error = "red"
accent = "cyan"
title = "cyan"
panel_border = "blue"
panel_border_active = "yellow"
kpi_label = "cyan"
kpi_value = "white"
kpi_caption = "dark_gray"
chart_axis = "gray"
chart_series_1 = "indexed(33)"
chart_series_2 = "indexed(202)"
chart_series_3 = "indexed(41)"
chart_series_4 = "indexed(135)"
chart_series_5 = "indexed(214)"
chart_series_6 = "indexed(45)"
chart_series_7 = "indexed(205)"
map_land = "dark_gray"
map_scale_1 = "indexed(54)"
map_scale_2 = "indexed(61)"
map_scale_3 = "indexed(30)"
map_scale_4 = "indexed(71)"
map_scale_5 = "indexed(220)"
"#;

    // Parse config
    let config: AppConfig = toml::from_str(config_toml).expect("Failed to parse config");

    // Validate - should pass with indexed colors
    assert!(config.validate().is_ok());

    // Create theme from config
    let theme =
        Theme::from_config(&config.theme).expect("Failed to create theme with indexed colors");

    // Verify indexed colors are parsed correctly
    assert_eq!(theme.get("controls_bg"), Color::Indexed(236));
    assert_eq!(theme.get("dimmed"), Color::Indexed(239));
    assert_eq!(theme.get("chart_series_1"), Color::Indexed(33));

    // Verify other colors still work
    assert_eq!(theme.get("accent"), Color::Cyan);
    assert_eq!(theme.get("error"), Color::Red);
}

#[test]
fn test_indexed_colors_in_default_config() {
    // Clear NO_COLOR for this test
    std::env::remove_var("NO_COLOR");

    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).expect("Failed to create theme");

    // Default config uses indexed(236) for the controls row
    assert_eq!(theme.get("controls_bg"), Color::Indexed(236));
}

#[test]
fn test_series_palette_cycles_after_seven() {
    std::env::remove_var("NO_COLOR");

    let mut config = AppConfig::default();
    config.theme.colors.chart_series_1 = "red".to_string();
    config.theme.colors.chart_series_2 = "green".to_string();
    config.theme.colors.chart_series_3 = "yellow".to_string();
    config.theme.colors.chart_series_4 = "blue".to_string();
    config.theme.colors.chart_series_5 = "magenta".to_string();
    config.theme.colors.chart_series_6 = "cyan".to_string();
    config.theme.colors.chart_series_7 = "white".to_string();

    let theme = Theme::from_config(&config.theme).expect("Failed to create theme");

    assert_eq!(theme.series_color(0), Color::Red);
    assert_eq!(theme.series_color(1), Color::Green);
    assert_eq!(theme.series_color(6), Color::White);

    // Eighth series wraps back to the first color
    assert_eq!(theme.series_color(7), Color::Red);
    assert_eq!(theme.series_color(8), Color::Green);
    assert_eq!(theme.series_color(20), theme.series_color(6));
}

#[test]
fn test_map_scale_buckets() {
    std::env::remove_var("NO_COLOR");

    let mut config = AppConfig::default();
    config.theme.colors.map_scale_1 = "indexed(54)".to_string();
    config.theme.colors.map_scale_2 = "indexed(61)".to_string();
    config.theme.colors.map_scale_3 = "indexed(30)".to_string();
    config.theme.colors.map_scale_4 = "indexed(71)".to_string();
    config.theme.colors.map_scale_5 = "indexed(220)".to_string();

    let theme = Theme::from_config(&config.theme).expect("Failed to create theme");

    assert_eq!(theme.map_scale_color(0), Color::Indexed(54));
    assert_eq!(theme.map_scale_color(1), Color::Indexed(61));
    assert_eq!(theme.map_scale_color(2), Color::Indexed(30));
    assert_eq!(theme.map_scale_color(3), Color::Indexed(71));
    assert_eq!(theme.map_scale_color(4), Color::Indexed(220));

    // Anything past the last bucket stays at the top of the scale
    assert_eq!(theme.map_scale_color(9), Color::Indexed(220));
}

#[test]
fn test_mixed_color_formats() {
    // Clear NO_COLOR for this test
    std::env::remove_var("NO_COLOR");

    let parser = tunedash::config::ColorParser::new();

    // All three formats should work together
    let named = parser.parse("cyan").unwrap();
    let hex = parser.parse("#ff0000").unwrap();
    let indexed = parser.parse("indexed(196)").unwrap();

    // Verify they're different color types
    assert_eq!(named, Color::Cyan);
    assert_eq!(indexed, Color::Indexed(196));
    // Hex depends on terminal capabilities, just verify it parses
    assert!(matches!(
        hex,
        Color::Rgb(_, _, _) | Color::Indexed(_) | Color::Red | Color::Reset
    ));
}
