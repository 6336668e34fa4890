use crate::types::{Commune, CommuneStats, PropertyType, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Tally {
    total: u32,
    house: u32,
    apartment: u32,
    industrial: u32,
    value_sum: f64,
    valued: u32,
}

impl Tally {
    fn add(&mut self, transaction: &Transaction) {
        self.total += 1;
        match transaction.type_local {
            PropertyType::House => self.house += 1,
            PropertyType::Apartment => self.apartment += 1,
            PropertyType::Industrial => self.industrial += 1,
            PropertyType::Other => {}
        }
        if let Some(value) = transaction.valeur_fonciere {
            self.value_sum += value;
            self.valued += 1;
        }
    }

    fn stats(&self) -> CommuneStats {
        // Rows without a value are left out of the mean, not counted as 0.
        let mean_value = if self.valued > 0 {
            self.value_sum / self.valued as f64
        } else {
            0.0
        };
        CommuneStats {
            transaction_number: self.total,
            house_number: self.house,
            indus_number: self.industrial,
            app_number: self.apartment,
            mean_value,
        }
    }
}

/// Attaches transaction statistics to every commune and returns the largest
/// transaction count, used as the top of the color scale.
pub fn aggregate(communes: &mut [Commune], transactions: &[Transaction]) -> u32 {
    info!("Aggregating {} transactions over {} communes...", transactions.len(), communes.len());

    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for transaction in transactions {
        tallies.entry(transaction.nom_commune.as_str()).or_default().add(transaction);
    }

    let mut max_transaction = 0;
    let mut unmatched = 0;

    for commune in communes.iter_mut() {
        commune.stats = match tallies.get(commune.name.as_str()) {
            Some(tally) => tally.stats(),
            None => {
                debug!("No transaction for commune '{}'", commune.name);
                unmatched += 1;
                CommuneStats::default()
            }
        };
        max_transaction = max_transaction.max(commune.stats.transaction_number);
    }

    if unmatched > 0 {
        warn!("{} communes have no transaction", unmatched);
    }
    info!("Max transactions for a single commune: {}", max_transaction);

    max_transaction
}
