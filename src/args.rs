use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for region_choropleth
#[derive(Debug, Parser)]
#[command(
    name = "region_choropleth",
    version,
    about = "Sum district measurements for a period and bind them onto GeoJSON boundaries"
)]
pub struct CliArgs {
    /// Record table (province, district, year, month, value)
    #[arg(long, default_value = "trash.csv")]
    pub csv: PathBuf,

    /// Local GeoJSON FeatureCollection, used when the download fails
    #[arg(long, default_value = "municipalities.geojson")]
    pub geojson: PathBuf,

    /// Boundary download location, tried before --geojson
    #[arg(long, default_value = region_choropleth::loader::DEFAULT_GEOJSON_URL)]
    pub geojson_url: String,

    /// Skip the download and read --geojson only
    #[arg(long)]
    pub offline: bool,

    /// Download timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// Run a single pass for this year instead of the interactive menu
    #[arg(short = 'y', long)]
    pub year: Option<i32>,

    /// Month to select with --year; omit to sum the whole year
    #[arg(short = 'm', long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Property holding the region name, skips auto-detection
    #[arg(long)]
    pub name_field: Option<String>,

    /// Rows in the top-N preview
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Directory for the CSV/GeoJSON/summary exports
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Fail when sampled features lack the name field
    #[arg(long)]
    pub strict_schema: bool,

    /// Features checked for the name field
    #[arg(long, default_value_t = 50)]
    pub sample: usize,
}
