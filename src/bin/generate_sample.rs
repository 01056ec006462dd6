//! Writes a synthetic client table, the matching feature sample and a small
//! LightGBM-format model, so the dashboard runs without production data.
//!
//! Output (relative to the working directory):
//! `data/default_risk.csv`, `data/X_sample.csv`, `model/model.json`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::{json, Value as Json};

const N_CLIENTS: usize = 500;
const FIRST_ID: i64 = 100_002;

const FEATURES: [&str; 5] = [
    "AMT_INCOME_TOTAL",
    "CNT_CHILDREN",
    "CREDIT_INCOME_PERCENT",
    "AGE_YEARS",
    "FLAG_OWN_CAR",
];

const FAMILY_STATUSES: [&str; 5] = [
    "Married",
    "Single / not married",
    "Civil marriage",
    "Separated",
    "Widow",
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Client {
    id: i64,
    female: bool,
    own_car: bool,
    own_realty: bool,
    days_birth: i64,
    income: f64,
    family_status: &'static str,
    children: i64,
    credit_income_percent: f64,
}

impl Client {
    fn features(&self) -> [f64; 5] {
        [
            self.income,
            self.children as f64,
            self.credit_income_percent,
            (self.days_birth.abs() / 365) as f64,
            if self.own_car { 1.0 } else { 0.0 },
        ]
    }
}

fn generate_clients(rng: &mut SimpleRng) -> Vec<Client> {
    (0..N_CLIENTS)
        .map(|i| {
            let age_years = rng.gauss(42.0, 11.0).clamp(21.0, 69.0);
            let income = (rng.gauss(11.8, 0.45).exp() / 500.0).round() * 500.0;
            let credit = income * rng.gauss(3.5, 1.2).clamp(0.5, 9.0);
            Client {
                id: FIRST_ID + i as i64,
                female: rng.next_f64() < 0.65,
                own_car: rng.next_f64() < 0.34,
                own_realty: rng.next_f64() < 0.69,
                days_birth: -((age_years * 365.0) as i64 + rng.below(365) as i64),
                income,
                family_status: FAMILY_STATUSES[rng.below(FAMILY_STATUSES.len())],
                children: [0, 0, 0, 1, 1, 2, 3][rng.below(7)],
                credit_income_percent: (credit / income * 100.0).round() / 100.0,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Model: hand-written trees, node counts taken from the generated rows
// ---------------------------------------------------------------------------

enum TreeSpec {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeSpec>,
        right: Box<TreeSpec>,
    },
    Leaf(f64),
}

fn split(feature: usize, threshold: f64, left: TreeSpec, right: TreeSpec) -> TreeSpec {
    TreeSpec::Split {
        feature,
        threshold,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn dump_node(spec: &TreeSpec, rows: &[[f64; 5]]) -> Json {
    match spec {
        TreeSpec::Leaf(value) => json!({ "leaf_value": value, "leaf_count": rows.len() }),
        TreeSpec::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            let (l, r): (Vec<[f64; 5]>, Vec<[f64; 5]>) =
                rows.iter().partition(|x| x[*feature] <= *threshold);
            json!({
                "split_feature": feature,
                "threshold": threshold,
                "decision_type": "<=",
                "default_left": true,
                "missing_type": "NaN",
                "internal_count": rows.len(),
                "left_child": dump_node(left, &l),
                "right_child": dump_node(right, &r),
            })
        }
    }
}

fn model_json(rows: &[[f64; 5]]) -> Json {
    let trees = [
        split(
            2,
            4.0,
            split(0, 150_000.0, TreeSpec::Leaf(-0.6), TreeSpec::Leaf(-1.4)),
            split(3, 35.0, TreeSpec::Leaf(0.9), TreeSpec::Leaf(0.1)),
        ),
        split(
            1,
            1.5,
            split(4, 0.5, TreeSpec::Leaf(-0.2), TreeSpec::Leaf(-0.5)),
            TreeSpec::Leaf(0.6),
        ),
        split(
            3,
            30.0,
            TreeSpec::Leaf(0.4),
            split(2, 6.0, TreeSpec::Leaf(-0.3), TreeSpec::Leaf(0.5)),
        ),
    ];

    let tree_info: Vec<Json> = trees
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "tree_index": i, "shrinkage": 1, "tree_structure": dump_node(t, rows) }))
        .collect();

    json!({
        "name": "tree",
        "version": "v3",
        "num_class": 1,
        "num_tree_per_iteration": 1,
        "label_index": 0,
        "max_feature_idx": FEATURES.len() - 1,
        "objective": "binary sigmoid:1",
        "average_output": false,
        "feature_names": FEATURES,
        "tree_info": tree_info,
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn yes_no(b: bool) -> &'static str {
    if b {
        "Y"
    } else {
        "N"
    }
}

fn write_clients(path: &Path, clients: &[Client]) -> anyhow::Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    w.write_record([
        "SK_ID_CURR",
        "CODE_GENDER",
        "FLAG_OWN_CAR",
        "FLAG_OWN_REALTY",
        "CNT_CHILDREN",
        "AMT_INCOME_TOTAL",
        "NAME_FAMILY_STATUS",
        "DAYS_BIRTH",
        "CREDIT_INCOME_PERCENT",
    ])?;
    for c in clients {
        w.write_record([
            c.id.to_string(),
            if c.female { "F" } else { "M" }.to_string(),
            yes_no(c.own_car).to_string(),
            yes_no(c.own_realty).to_string(),
            c.children.to_string(),
            format!("{:.1}", c.income),
            c.family_status.to_string(),
            c.days_birth.to_string(),
            c.credit_income_percent.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_features(path: &Path, clients: &[Client]) -> anyhow::Result<()> {
    let mut w = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let mut header = vec!["SK_ID_CURR"];
    header.extend(FEATURES);
    header.push("TARGET");
    w.write_record(&header)?;
    for c in clients {
        let mut record = vec![c.id.to_string()];
        record.extend(c.features().iter().map(|v| v.to_string()));
        // Placeholder label column, excluded from scoring.
        record.push(String::new());
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let clients = generate_clients(&mut rng);
    let rows: Vec<[f64; 5]> = clients.iter().map(Client::features).collect();

    fs::create_dir_all("data")?;
    fs::create_dir_all("model")?;

    write_clients(Path::new("data/default_risk.csv"), &clients)?;
    write_features(Path::new("data/X_sample.csv"), &clients)?;
    let model = serde_json::to_string_pretty(&model_json(&rows))?;
    fs::write("model/model.json", model).context("writing model/model.json")?;

    println!(
        "Wrote {} clients to data/default_risk.csv, data/X_sample.csv and a {}-feature model to model/model.json",
        clients.len(),
        FEATURES.len()
    );
    Ok(())
}
