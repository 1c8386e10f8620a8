// src/models/world2.rs
#![cfg(feature = "model-world2")]

//! Forrester's World2: five levels (population, pollution, capital
//! investment, natural resources, agricultural capital fraction) coupled
//! through table functions, integrated with explicit Euler.
//!
//! One call to `run_n_steps(state, 1)` advances one year in `substeps` Euler
//! increments. Five parameters are exposed as controls: BRN, NRUN, CIGN, POLN
//! and FC. Their live values are part of the raw state so the agent sees them.

use std::cell::RefCell;

use bevy_prng::WyRand;
use serde::Deserialize;

use crate::error::{EnvError, Result};
use crate::mechanics::{stoch, table::Table};
use crate::models::sdk::{Model, ParamSet};

pub const YEAR_MIN: f64 = 1900.0;

const LEVELS: [&str; 5] = ["P", "POL", "CI", "NR", "CIAF"];
const RATES: [&str; 7] = ["BR", "DR", "NRUR", "CIG", "CID", "POLG", "POLA"];
const AUX: [&str; 10] = ["CR", "MSL", "CIR", "ECIR", "NREM", "NRFR", "CIRA", "FR", "POLR", "QL"];
const CONTROLS: [&str; 5] = ["BRN", "NRUN", "CIGN", "POLN", "FC"];
const CONTROL_RANGES: [(f64, f64); 5] = [
    (0.01, 0.08),
    (0.1, 2.0),
    (0.01, 0.1),
    (0.1, 2.0),
    (0.5, 2.0),
];
const AGENT_AUX: [&str; 5] = ["MSL", "CR", "FR", "POLR", "QL"];
const SUMMARY: [&str; 5] = ["P", "POLR", "CI", "QL", "NR"];

/* --- table functions --- */

const BRMM: Table = Table::new(0.0, 5.0, &[1.2, 1.0, 0.85, 0.75, 0.7, 0.7]);
const BRCM: Table = Table::new(0.0, 5.0, &[1.05, 1.0, 0.9, 0.7, 0.6, 0.55]);
const BRFM: Table = Table::new(0.0, 4.0, &[0.0, 1.0, 1.6, 1.9, 2.0]);
const BRPM: Table = Table::new(0.0, 60.0, &[1.02, 0.9, 0.7, 0.4, 0.25, 0.15, 0.1]);
const DRMM: Table = Table::new(
    0.0,
    5.0,
    &[3.0, 1.8, 1.0, 0.8, 0.7, 0.6, 0.53, 0.5, 0.5, 0.5, 0.5],
);
const DRPM: Table = Table::new(0.0, 60.0, &[0.92, 1.3, 2.0, 3.2, 4.8, 6.8, 9.2]);
const DRFM: Table = Table::new(0.0, 2.0, &[30.0, 3.0, 2.0, 1.4, 1.0, 0.7, 0.6, 0.5, 0.5]);
const DRCM: Table = Table::new(0.0, 5.0, &[0.9, 1.0, 1.2, 1.5, 1.9, 3.0]);
const NREM: Table = Table::new(0.0, 1.0, &[0.0, 0.15, 0.5, 0.85, 1.0]);
const NRMM: Table = Table::new(
    0.0,
    10.0,
    &[0.0, 1.0, 1.8, 2.4, 2.9, 3.3, 3.6, 3.8, 3.9, 3.95, 4.0],
);
const CIM: Table = Table::new(0.0, 5.0, &[0.1, 1.0, 1.8, 2.4, 2.8, 3.0]);
const FPCI: Table = Table::new(0.0, 6.0, &[0.5, 1.0, 1.4, 1.7, 1.9, 2.05, 2.2]);
const FCM: Table = Table::new(0.0, 5.0, &[2.4, 1.0, 0.6, 0.4, 0.3, 0.2]);
const FPM: Table = Table::new(0.0, 60.0, &[1.02, 0.9, 0.65, 0.35, 0.2, 0.1, 0.05]);
const POLCM: Table = Table::new(0.0, 5.0, &[0.05, 1.0, 3.0, 5.4, 7.4, 8.0]);
const POLAT: Table = Table::new(0.0, 60.0, &[0.6, 2.5, 5.0, 8.0, 11.5, 15.5, 20.0]);
const CFIFR: Table = Table::new(0.0, 2.0, &[1.0, 0.6, 0.3, 0.15, 0.1]);
const CIQR: Table = Table::new(0.0, 2.0, &[0.7, 0.8, 1.0, 1.5, 2.0]);
const QLM: Table = Table::new(0.0, 5.0, &[0.2, 1.0, 1.7, 2.3, 2.7, 2.9]);
const QLC: Table = Table::new(
    0.0,
    5.0,
    &[2.0, 1.3, 1.0, 0.75, 0.55, 0.45, 0.38, 0.3, 0.25, 0.22, 0.2],
);
const QLF: Table = Table::new(0.0, 4.0, &[0.0, 1.0, 1.8, 2.4, 2.7]);
const QLP: Table = Table::new(0.0, 60.0, &[1.04, 0.85, 0.6, 0.3, 0.15, 0.05, 0.02]);

/// Model parameters as accepted by the registry.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub stochastic: bool,
    /// Euler increments per simulated year.
    pub substeps: usize,
    /// Year offset at which NRUN switches to `nrun_after` (None: never).
    pub policy_year: Option<usize>,
    pub nrun_after: f64,
    /// Relative std-dev of initial levels when stochastic.
    pub jitter: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stochastic: false,
            substeps: 5,
            policy_year: Some(70),
            nrun_after: 0.25,
            jitter: 0.05,
        }
    }
}

/// Every numeric parameter of the model, controls first.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Values {
    brn: f64,
    nrun: f64,
    cign: f64,
    poln: f64,
    fc: f64,
    drn: f64,
    la: f64,
    pdn: f64,
    nri: f64,
    ciafn: f64,
    ciaft: f64,
    cidn: f64,
    ecirn: f64,
    fn_: f64,
    pols: f64,
    qls: f64,
}

impl Default for Values {
    fn default() -> Self {
        Self {
            brn: 0.04,
            nrun: 1.0,
            cign: 0.05,
            poln: 1.0,
            fc: 1.0,
            drn: 0.028,
            la: 135e6,
            pdn: 26.5,
            nri: 900e9,
            ciafn: 0.3,
            ciaft: 15.0,
            cidn: 0.025,
            ecirn: 1.0,
            fn_: 1.0,
            pols: 3.6e9,
            qls: 1.0,
        }
    }
}

impl Values {
    fn entries(&self) -> [(&'static str, f64); 16] {
        [
            ("BRN", self.brn),
            ("NRUN", self.nrun),
            ("CIGN", self.cign),
            ("POLN", self.poln),
            ("FC", self.fc),
            ("DRN", self.drn),
            ("LA", self.la),
            ("PDN", self.pdn),
            ("NRI", self.nri),
            ("CIAFN", self.ciafn),
            ("CIAFT", self.ciaft),
            ("CIDN", self.cidn),
            ("ECIRN", self.ecirn),
            ("FN", self.fn_),
            ("POLS", self.pols),
            ("QLS", self.qls),
        ]
    }

    fn to_params(self) -> ParamSet {
        self.entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Every name must be present; a missing one is a wiring bug.
    fn from_params(params: &ParamSet) -> Result<Self> {
        let get = |name: &str| {
            params
                .get(name)
                .copied()
                .ok_or_else(|| EnvError::InvalidParams {
                    id: "world2".to_string(),
                    reason: format!("parameter '{name}' is missing"),
                })
        };
        Ok(Self {
            brn: get("BRN")?,
            nrun: get("NRUN")?,
            cign: get("CIGN")?,
            poln: get("POLN")?,
            fc: get("FC")?,
            drn: get("DRN")?,
            la: get("LA")?,
            pdn: get("PDN")?,
            nri: get("NRI")?,
            ciafn: get("CIAFN")?,
            ciaft: get("CIAFT")?,
            cidn: get("CIDN")?,
            ecirn: get("ECIRN")?,
            fn_: get("FN")?,
            pols: get("POLS")?,
            qls: get("QLS")?,
        })
    }

    fn controls(&self) -> [f64; 5] {
        [self.brn, self.nrun, self.cign, self.poln, self.fc]
    }
}

const INITIAL_LEVELS: [f64; 5] = [1.65e9, 0.2e9, 0.4e9, 900e9, 0.2];

fn labels(groups: &[&[&str]]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.iter().map(|s| s.to_string()))
        .collect()
}

pub struct World2 {
    cfg: Config,
    params: ParamSet,
    initial_levels: [f64; 5],
    state: Vec<f64>,
    internal_labels: Vec<String>,
    agent_labels: Vec<String>,
    controls: Vec<String>,
    ranges: Vec<(f64, f64)>,
    stocks: Vec<String>,
    rates: Vec<String>,
    summary: Vec<String>,
}

impl World2 {
    pub fn new(cfg: Config) -> Self {
        let state = evaluate(&INITIAL_LEVELS, &Values::default());
        Self {
            cfg,
            params: Values::default().to_params(),
            initial_levels: INITIAL_LEVELS,
            state,
            internal_labels: labels(&[&LEVELS, &RATES, &AUX, &CONTROLS]),
            agent_labels: labels(&[&LEVELS, &RATES, &AGENT_AUX, &CONTROLS]),
            controls: labels(&[&CONTROLS]),
            ranges: CONTROL_RANGES.to_vec(),
            stocks: labels(&[&LEVELS]),
            rates: labels(&[&RATES]),
            summary: labels(&[&SUMMARY]),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn restart(&mut self) {
        let values = Values::default();
        self.params = values.to_params();
        self.state = evaluate(&self.initial_levels, &values);
    }
}

impl Default for World2 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Model for World2 {
    fn stochastic(&self) -> bool {
        self.cfg.stochastic
    }

    fn state_labels_for_agent(&self) -> &[String] {
        &self.agent_labels
    }

    fn internal_states_labels(&self) -> &[String] {
        &self.internal_labels
    }

    fn control_variables(&self) -> &[String] {
        &self.controls
    }

    fn control_variables_ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    fn current_internal_params(&self) -> &ParamSet {
        &self.params
    }

    fn current_internal_params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn reset(&mut self, rng: &RefCell<WyRand>) {
        self.initial_levels = INITIAL_LEVELS;
        if self.cfg.stochastic {
            // CIAF is a fraction; only the four extensive levels are perturbed.
            for level in self.initial_levels.iter_mut().take(4) {
                *level *= stoch::jitter(rng, self.cfg.jitter);
            }
        }
        self.restart();
    }

    fn reset_same_model(&mut self) {
        self.restart();
    }

    fn current_state(&self) -> Vec<f64> {
        self.state.clone()
    }

    fn run_n_steps(&mut self, state: &[f64], n: usize) -> Result<Vec<Vec<f64>>> {
        let values = Values::from_params(&self.params)?;
        let mut levels = [0.0; 5];
        for (l, s) in levels.iter_mut().zip(state) {
            *l = *s;
        }
        let substeps = self.cfg.substeps.max(1);
        let dt = 1.0 / substeps as f64;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            for _ in 0..substeps {
                let s = evaluate(&levels, &values);
                let d = derivatives(&s, &levels, &values);
                for (l, dl) in levels.iter_mut().zip(d) {
                    *l = (*l + dt * dl).max(0.0);
                }
            }
            out.push(evaluate(&levels, &values));
        }
        if let Some(last) = out.last() {
            self.state = last.clone();
        }
        Ok(out)
    }

    fn stocks(&self) -> &[String] {
        &self.stocks
    }

    fn rates(&self) -> &[String] {
        &self.rates
    }

    fn summary_labels(&self) -> &[String] {
        &self.summary
    }

    fn year_min(&self) -> f64 {
        YEAR_MIN
    }

    fn on_time_unit(&mut self, t: usize) {
        if self.cfg.policy_year == Some(t) {
            self.params.insert("NRUN".to_string(), self.cfg.nrun_after);
        }
    }
}

/* --- equations --- */

/// Full raw state (levels, rates, aux, controls) for the given levels.
fn evaluate(levels: &[f64; 5], v: &Values) -> Vec<f64> {
    let [p, pol, ci, nr, ciaf] = *levels;
    let p_safe = p.max(1.0);

    let cr = p / (v.la * v.pdn);
    let cir = ci / p_safe;
    let nrfr = nr / v.nri;
    let nrem = NREM.at(nrfr);
    let ecir = cir * (1.0 - ciaf) * nrem / (1.0 - v.ciafn);
    let msl = ecir / v.ecirn;
    let cira = cir * ciaf / v.ciafn;
    let polr = pol / v.pols;
    let fr = FPCI.at(cira) * FCM.at(cr) * FPM.at(polr) * v.fc / v.fn_;
    let ql = v.qls * QLM.at(msl) * QLC.at(cr) * QLF.at(fr) * QLP.at(polr);

    let br = p * v.brn * BRFM.at(fr) * BRMM.at(msl) * BRCM.at(cr) * BRPM.at(polr);
    let dr = p * v.drn * DRMM.at(msl) * DRPM.at(polr) * DRFM.at(fr) * DRCM.at(cr);
    let nrur = p * v.nrun * NRMM.at(msl);
    let cig = p * CIM.at(msl) * v.cign;
    let cid = ci * v.cidn;
    let polg = p * v.poln * POLCM.at(cir);
    let pola = pol / POLAT.at(polr);

    let mut s = Vec::with_capacity(LEVELS.len() + RATES.len() + AUX.len() + CONTROLS.len());
    s.extend_from_slice(levels);
    s.extend_from_slice(&[br, dr, nrur, cig, cid, polg, pola]);
    s.extend_from_slice(&[cr, msl, cir, ecir, nrem, nrfr, cira, fr, polr, ql]);
    s.extend_from_slice(&v.controls());
    s
}

/// d(levels)/dt from an evaluated state.
fn derivatives(s: &[f64], levels: &[f64; 5], v: &Values) -> [f64; 5] {
    let at = |offset: usize| s[LEVELS.len() + offset];
    let (br, dr, nrur, cig, cid, polg, pola) = (at(0), at(1), at(2), at(3), at(4), at(5), at(6));
    let aux = LEVELS.len() + RATES.len();
    let msl = s[aux + 1];
    let fr = s[aux + 7];

    let qlf = QLF.at(fr).max(1e-9);
    let ciaf_target = CFIFR.at(fr) * CIQR.at(QLM.at(msl) / qlf);
    let dciaf = (ciaf_target - levels[4]) / v.ciaft;

    [br - dr, polg - pola, cig - cid, -nrur, dciaf]
}
