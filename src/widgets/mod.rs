pub mod category_bar;
pub mod controls;
pub mod debug;
pub mod kpi;
pub mod sunburst;
pub mod treemap;
pub mod worldmap;
pub mod xy_chart;
