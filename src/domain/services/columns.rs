use crate::domain::model::{FlatRecord, NormalizedTable};
use std::collections::{BTreeSet, HashSet};

/// Columns that always lead the sheet, in this order, whether or not the
/// current batch fills them. Keeps the sheet layout stable between runs.
///
/// The `[CT]`/`[CN]`/`[FT]` entries are a curated list of the criteria this
/// site's agents fill in most; other criteria land after them in byte order.
pub const PREFERRED_COLUMNS: &[&str] = &[
    "id",
    "customers_id",
    "price",
    "created_at",
    "last_modified",
    "model",
    "status_web",
    "Category_name",
    "Description_title",
    "Description_text",
    "Suivi_par_nom",
    "Suivi_par_email",
    "Suivi_par_tel",
    "Suivi_par_mobile",
    "Cree_par_nom",
    "Cree_par_email",
    "Cree_par_tel",
    "Cree_par_mobile",
    "Customer_nom",
    "Customer_email",
    "Customer_tel",
    "Customer_creation_date",
    "Customer_next_contact",
    "Customer_last_action",
    "INSEE_code_insee",
    "INSEE_commune",
    "INSEE_arrondissement",
    "INSEE_secteur",
    "Statistic_nb_vues",
    "Statistic_nb_contacts",
    "Statistic_nb_visites",
    "Compromis_date_offre",
    "Compromis_date_compromis",
    "Compromis_date_acte",
    "Compromis_date_annulation",
    "Compromis_date_fin_sru",
    "Compromis_status",
    "Photos",
    "Rooms",
    "Themes",
    "[CT] Ville",
    "[CT] Code postal",
    "[CT] Quartier",
    "[CT] Type de bien",
    "[CT] Type de mandat",
    "[CT] Chauffage",
    "[CN] Surface habitable",
    "[CN] Surface terrain",
    "[CN] Nombre de pièces",
    "[CN] Nombre de chambres",
    "[CN] Nombre de salles de bain",
    "[CN] Etage",
    "[CN] Honoraires",
    "[CN] Charges",
    "[CN] Taxe foncière",
    "[CN] DPE consommation",
    "[CN] GES émission",
    "[FT] Descriptif",
    "[FT] Commentaire interne",
];

#[derive(Debug, Clone)]
pub struct ColumnNormalizer {
    preferred: Vec<String>,
}

impl Default for ColumnNormalizer {
    fn default() -> Self {
        Self::new(PREFERRED_COLUMNS.iter().copied())
    }
}

impl ColumnNormalizer {
    /// Repeated preferred names keep their first position.
    pub fn new<I, S>(preferred: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let preferred = preferred
            .into_iter()
            .map(Into::into)
            .filter(|column: &String| seen.insert(column.clone()))
            .collect();
        Self { preferred }
    }

    pub fn preferred(&self) -> &[String] {
        &self.preferred
    }

    /// Preferred columns first, then every other column seen in `records`
    /// sorted lexicographically. Rows keep their input order.
    pub fn columns_for(&self, records: &[FlatRecord]) -> Vec<String> {
        let preferred: HashSet<&str> = self.preferred.iter().map(String::as_str).collect();
        let extras: BTreeSet<&str> = records
            .iter()
            .flat_map(FlatRecord::keys)
            .filter(|column| !preferred.contains(column))
            .collect();

        self.preferred
            .iter()
            .cloned()
            .chain(extras.into_iter().map(str::to_string))
            .collect()
    }

    pub fn normalize(&self, records: &[FlatRecord]) -> NormalizedTable {
        let columns = self.columns_for(records);
        let rows = records.iter().map(|r| r.reindex(&columns)).collect();
        NormalizedTable { columns, rows }
    }
}
