use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// Neighborhood name and approximate center.
const NEIGHBORHOODS: [(&str, f64, f64); 18] = [
    ("Centro", -25.4296, -49.2713),
    ("Batel", -25.4423, -49.2880),
    ("Água Verde", -25.4520, -49.2830),
    ("Rebouças", -25.4440, -49.2640),
    ("Cristo Rei", -25.4350, -49.2450),
    ("Alto da XV", -25.4230, -49.2550),
    ("Bigorrilho", -25.4370, -49.2980),
    ("Mercês", -25.4240, -49.2890),
    ("Portão", -25.4730, -49.2970),
    ("Boqueirão", -25.5030, -49.2430),
    ("Cabral", -25.4080, -49.2580),
    ("Juvevê", -25.4150, -49.2620),
    ("Ahú", -25.4050, -49.2650),
    ("Santa Felicidade", -25.4020, -49.3330),
    ("Hauer", -25.4800, -49.2500),
    ("Pinheirinho", -25.5170, -49.2950),
    ("Bacacheri", -25.3950, -49.2350),
    ("Cajuru", -25.4520, -49.2140),
];

const COMPANIES: [&str; 6] = [
    "Acme",
    "Banca Central",
    "Café Expresso",
    "Farmácia Íris",
    "Kiosk Co",
    "Mercado Sul",
];

const CATEGORIES: [&str; 4] = ["Food", "Retail", "Pharmacy", "Newsstand"];

const STREETS: [&str; 5] = [
    "Rua XV de Novembro",
    "Av. Sete de Setembro",
    "Rua Marechal Deodoro",
    "Av. Visconde de Guarapuava",
    "Rua Comendador Araújo",
];

struct Point {
    id: i64,
    name: String,
    company: String,
    category: String,
    neighborhood: String,
    address: String,
}

struct Coord {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
}

fn generate(rng: &mut SimpleRng, n: i64) -> (Vec<Point>, Vec<Coord>) {
    let mut points = Vec::new();
    let mut coords = Vec::new();

    for id in 1..=n {
        // Skew towards the first neighborhoods so the chart has a clear top.
        let slot = ((rng.next_f64().powi(2)) * NEIGHBORHOODS.len() as f64) as usize;
        let (neighborhood, lat, lon) = NEIGHBORHOODS[slot.min(NEIGHBORHOODS.len() - 1)];
        let company = rng.pick(&COMPANIES);

        points.push(Point {
            id,
            name: format!("{company} #{id}"),
            company: company.to_string(),
            category: rng.pick(&CATEGORIES).to_string(),
            neighborhood: neighborhood.to_string(),
            address: format!("{}, {}", rng.pick(&STREETS), 100 + rng.next_u64() % 3000),
        });

        // Every 17th point has no coordinates row, every 23rd a blank latitude.
        if id % 17 == 0 {
            continue;
        }
        coords.push(Coord {
            id,
            lat: (id % 23 != 0).then(|| rng.gauss(lat, 0.004)),
            lon: Some(rng.gauss(lon, 0.004)),
        });
    }
    (points, coords)
}

fn points_batch(points: &[Point]) -> Result<RecordBatch> {
    let text = |f: fn(&Point) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(points.iter().map(f).collect::<Vec<_>>()))
    };
    let schema = Arc::new(Schema::new(vec![
        Field::new("numero", DataType::Int64, false),
        Field::new("Nome do Ponto", DataType::Utf8, false),
        Field::new("Empresa", DataType::Utf8, false),
        Field::new("Categoria", DataType::Utf8, false),
        Field::new("Bairro", DataType::Utf8, false),
        Field::new("Endereço Completo", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(points.iter().map(|p| p.id).collect::<Vec<_>>())),
            text(|p| p.name.as_str()),
            text(|p| p.company.as_str()),
            text(|p| p.category.as_str()),
            text(|p| p.neighborhood.as_str()),
            text(|p| p.address.as_str()),
        ],
    )?;
    Ok(batch)
}

fn coords_batch(coords: &[Coord]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("enum", DataType::Int64, false),
        Field::new("lat", DataType::Float64, true),
        Field::new("lon", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(coords.iter().map(|c| c.id).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(coords.iter().map(|c| c.lat).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(coords.iter().map(|c| c.lon).collect::<Vec<_>>())),
        ],
    )?;
    Ok(batch)
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path:?}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_points_csv(path: &Path, points: &[Point]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path:?}"))?;
    writer.write_record([
        "numero",
        "Nome do Ponto",
        "Empresa",
        "Categoria",
        "Bairro",
        "Endereço Completo",
    ])?;
    for p in points {
        writer.write_record([
            p.id.to_string().as_str(),
            p.name.as_str(),
            p.company.as_str(),
            p.category.as_str(),
            p.neighborhood.as_str(),
            p.address.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_coords_csv(path: &Path, coords: &[Coord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path:?}"))?;
    writer.write_record(["enum", "lat", "lon"])?;
    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for c in coords {
        writer.write_record([c.id.to_string(), cell(c.lat), cell(c.lon)])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {out_dir:?}"))?;

    let mut rng = SimpleRng::new(42);
    let (points, coords) = generate(&mut rng, 400);

    write_parquet(&out_dir.join("points.parquet"), &points_batch(&points)?)?;
    write_parquet(&out_dir.join("coords.parquet"), &coords_batch(&coords)?)?;
    write_points_csv(&out_dir.join("points.csv"), &points)?;
    write_coords_csv(&out_dir.join("coords.csv"), &coords)?;

    println!(
        "Wrote {} points and {} coordinate rows to {}",
        points.len(),
        coords.len(),
        out_dir.display()
    );
    Ok(())
}
