// src/models/rack.rs

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

pub const MAX_LEVELS: i32 = 50;
pub const MAX_POSITIONS_PER_LEVEL: i32 = 100;

// --- 1. Rack (a estrutura física) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rack {
    pub id: Uuid,
    #[schema(example = "Rack A - Almoxarifado")]
    pub name: String,
    #[schema(example = 4)]
    pub levels: i32,
    #[schema(example = 6)]
    pub positions_per_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Item guardado numa posição ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressItem {
    // O frontend gera ids temporários; itens sem id ganham um no servidor.
    pub id: Option<Uuid>,
    #[validate(custom(function = "crate::common::validation::not_blank", message = "O nome do item é obrigatório."))]
    #[schema(example = "Cabo HDMI 2m")]
    pub name: String,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    #[schema(example = 12)]
    pub quantity: i32,
}

// --- 3. Endereço (nível + posição nomeada) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub rack_id: Uuid,
    #[schema(example = 1)]
    pub level: i32,
    #[schema(example = "A")]
    pub name: String,
    #[schema(value_type = Vec<AddressItem>)]
    pub items: Json<Vec<AddressItem>>,
    pub observation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelLayout {
    pub level: i32,
    pub positions: Vec<Address>,
}

// Rack completo, pronto para o frontend desenhar a estrutura
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RackLayout {
    #[serde(flatten)]
    pub rack: Rack,
    pub structure: Vec<LevelLayout>,
}

// Resultado da busca de um item pelos endereços
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemLocation {
    pub rack_id: Uuid,
    pub rack_name: String,
    pub address_id: Uuid,
    pub level: i32,
    pub position: String,
    #[schema(value_type = Vec<AddressItem>)]
    pub items: Json<Vec<AddressItem>>,
}

// ---
// Regras de endereçamento
// ---

/// Rótulo de planilha para a posição `index` (0 -> "A", 25 -> "Z", 26 -> "AA").
pub fn position_label(index: u32) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        label.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Gera os pares (nível, posição) de um bloco de níveis.
pub fn generate_addresses(levels: &[i32], positions_per_level: u32) -> Vec<(i32, String)> {
    levels
        .iter()
        .flat_map(|&level| (0..positions_per_level).map(move |i| (level, position_label(i))))
        .collect()
}

/// Próximos números de nível: `max + 1 ..= max + count`.
pub fn next_level_numbers(existing: &[i32], count: u32) -> Vec<i32> {
    let max = existing.iter().copied().max().unwrap_or(0);
    (1..=count as i32).map(|offset| max + offset).collect()
}

/// Números dos níveis novos, recusando o que passar de `MAX_LEVELS`.
pub fn checked_next_levels(existing: &[i32], count: u32) -> Result<Vec<i32>, AppError> {
    let new_levels = next_level_numbers(existing, count);
    match new_levels.last() {
        Some(&top) if top > MAX_LEVELS => Err(AppError::TooManyLevels(MAX_LEVELS)),
        _ => Ok(new_levels),
    }
}

pub fn check_position_capacity(level: i32, occupied: usize, adding: usize) -> Result<(), AppError> {
    if !(1..=MAX_LEVELS).contains(&level) {
        return Err(AppError::TooManyLevels(MAX_LEVELS));
    }
    if occupied + adding > MAX_POSITIONS_PER_LEVEL as usize {
        return Err(AppError::TooManyPositions(MAX_POSITIONS_PER_LEVEL));
    }
    Ok(())
}
/// Padrão para `ILIKE ... ESCAPE '\'` que casa o texto literal em qualquer trecho.
/// Padrão `ILIKE ... ESCAPE '\\'` que casa o texto literal em qualquer trecho.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Normaliza nomes de posições: separa por vírgula, apara, remove vazios e repetidos.
pub fn parse_position_names<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .flat_map(|chunk| chunk.as_ref().split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

/// Ordem natural de rótulos: "B" < "Z" < "AA" < "AB".
pub fn natural_position_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Garante um id para cada item (substitui a edição inteira, sem merge).
pub fn assign_item_ids(items: Vec<AddressItem>) -> Vec<AddressItem> {
    items
        .into_iter()
        .map(|item| AddressItem {
            id: Some(item.id.unwrap_or_else(Uuid::new_v4)),
            ..item
        })
        .collect()
}

/// Agrupa endereços por nível, com as posições em ordem natural.
pub fn group_by_level(addresses: Vec<Address>) -> Vec<LevelLayout> {
    let mut levels: BTreeMap<i32, Vec<Address>> = BTreeMap::new();
    for address in addresses {
        levels.entry(address.level).or_default().push(address);
    }
    levels
        .into_iter()
        .map(|(level, mut positions)| {
            positions.sort_by(|a, b| natural_position_order(&a.name, &b.name));
            LevelLayout { level, positions }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_spreadsheet_columns() {
        assert_eq!(position_label(0), "A");
        assert_eq!(position_label(25), "Z");
        assert_eq!(position_label(26), "AA");
        assert_eq!(position_label(27), "AB");
        assert_eq!(position_label(701), "ZZ");
        assert_eq!(position_label(702), "AAA");
    }

    #[test]
    fn rack_generation_yields_levels_times_positions_unique_pairs() {
        let levels: Vec<i32> = (1..=4).collect();
        let generated = generate_addresses(&levels, 30);
        assert_eq!(generated.len(), 4 * 30);

        let unique: HashSet<_> = generated.iter().cloned().collect();
        assert_eq!(unique.len(), generated.len());
        assert!(generated.contains(&(4, "AD".to_string())));
    }

    #[test]
    fn next_levels_continue_after_the_highest_existing_level() {
        assert_eq!(next_level_numbers(&[1, 2, 5], 2), vec![6, 7]);
        assert_eq!(next_level_numbers(&[], 3), vec![1, 2, 3]);
    }

    #[test]
    fn new_levels_cannot_pass_the_rack_limit() {
        let full: Vec<i32> = (1..=MAX_LEVELS).collect();
        assert!(matches!(checked_next_levels(&full, 1), Err(AppError::TooManyLevels(50))));
        assert!(matches!(checked_next_levels(&[1, 2], 49), Err(AppError::TooManyLevels(_))));
        assert_eq!(checked_next_levels(&[1, 2], 48).unwrap().last(), Some(&50));
    }

    #[test]
    fn search_wildcards_are_matched_literally() {
        assert_eq!(contains_pattern("hdmi"), "%hdmi%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern(r"C:\temp"), r"%C:\\temp%");
    }

    #[test]
    fn positions_per_level_are_capped() {
        assert!(check_position_capacity(3, 98, 2).is_ok());
        assert!(matches!(check_position_capacity(3, 99, 2), Err(AppError::TooManyPositions(100))));
        assert!(matches!(check_position_capacity(0, 0, 1), Err(AppError::TooManyLevels(_))));
        assert!(matches!(check_position_capacity(51, 0, 1), Err(AppError::TooManyLevels(_))));
    }

    #[test]
    fn position_names_are_trimmed_and_deduplicated() {
        let parsed = parse_position_names(&[" A1, A2 ,,A1", "B1", "  "]);
        assert_eq!(parsed, vec!["A1", "A2", "B1"]);
    }

    #[test]
    fn items_without_id_receive_one_and_existing_ids_are_kept() {
        let keep = Uuid::new_v4();
        let items = assign_item_ids(vec![
            AddressItem { id: Some(keep), name: "Mouse".into(), quantity: 3 },
            AddressItem { id: None, name: "Teclado".into(), quantity: 1 },
        ]);
        assert_eq!(items[0].id, Some(keep));
        assert!(items[1].id.is_some());
    }

    #[test]
    fn layout_groups_levels_and_sorts_positions_naturally() {
        let rack_id = Uuid::new_v4();
        let address = |level: i32, name: &str| Address {
            id: Uuid::new_v4(),
            rack_id,
            level,
            name: name.to_string(),
            items: Json(vec![]),
            observation: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let layout = group_by_level(vec![
            address(2, "AA"),
            address(1, "B"),
            address(2, "Z"),
            address(1, "A"),
        ]);

        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].level, 1);
        let level2: Vec<_> = layout[1].positions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(level2, vec!["Z", "AA"]);
    }
}
