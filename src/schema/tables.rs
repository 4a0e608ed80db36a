//! Table schema definitions for resource pack and behavior pack content

use super::types::*;

// =============================================================================
// Pack containers
// =============================================================================

pub static RESOURCE_PACK: TableSchema = TableSchema {
    name: "ResourcePack",
    columns: &[Column::required("path", ColumnType::Path)],
    relations: &[],
};

pub static BEHAVIOR_PACK: TableSchema = TableSchema {
    name: "BehaviorPack",
    columns: &[Column::required("path", ColumnType::Path)],
    relations: &[],
};

// =============================================================================
// Resource pack: client entities
// =============================================================================

pub static CLIENT_ENTITY_FILE: TableSchema = TableSchema {
    name: "ClientEntityFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::new("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

pub static CLIENT_ENTITY: TableSchema = TableSchema {
    name: "ClientEntity",
    columns: &[
        Column::required("ClientEntityFile_fk", ColumnType::Integer),
        Column::new("identifier", ColumnType::Text),
    ],
    relations: &[Relation::unique(
        "ClientEntityFile_fk",
        "ClientEntityFile",
        "ClientEntityFile_pk",
    )],
};

pub static CLIENT_ENTITY_RENDER_CONTROLLER_FIELD: TableSchema = TableSchema {
    name: "ClientEntityRenderControllerField",
    columns: &[
        Column::required("ClientEntity_fk", ColumnType::Integer),
        Column::new("identifier", ColumnType::Text),
        Column::new("condition", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("ClientEntity_fk", "ClientEntity", "ClientEntity_pk")],
};

pub static CLIENT_ENTITY_GEOMETRY_FIELD: TableSchema = TableSchema {
    name: "ClientEntityGeometryField",
    columns: &[
        Column::required("ClientEntity_fk", ColumnType::Integer),
        Column::new("shortName", ColumnType::Text),
        Column::new("identifier", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("ClientEntity_fk", "ClientEntity", "ClientEntity_pk")],
};

pub static CLIENT_ENTITY_TEXTURE_FIELD: TableSchema = TableSchema {
    name: "ClientEntityTextureField",
    columns: &[
        Column::required("ClientEntity_fk", ColumnType::Integer),
        Column::new("shortName", ColumnType::Text),
        // Texture path without the extension
        Column::new("identifier", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("ClientEntity_fk", "ClientEntity", "ClientEntity_pk")],
};

pub static CLIENT_ENTITY_MATERIAL_FIELD: TableSchema = TableSchema {
    name: "ClientEntityMaterialField",
    columns: &[
        Column::required("ClientEntity_fk", ColumnType::Integer),
        Column::new("shortName", ColumnType::Text),
        Column::new("identifier", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("ClientEntity_fk", "ClientEntity", "ClientEntity_pk")],
};

pub static CLIENT_ENTITY_ANIMATION_FIELD: TableSchema = TableSchema {
    name: "ClientEntityAnimationField",
    columns: &[
        Column::required("ClientEntity_fk", ColumnType::Integer),
        Column::new("shortName", ColumnType::Text),
        Column::new("identifier", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("ClientEntity_fk", "ClientEntity", "ClientEntity_pk")],
};

// =============================================================================
// Resource pack: geometries and render controllers
// =============================================================================

pub static GEOMETRY_FILE: TableSchema = TableSchema {
    name: "GeometryFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::new("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

pub static GEOMETRY: TableSchema = TableSchema {
    name: "Geometry",
    columns: &[
        Column::required("GeometryFile_fk", ColumnType::Integer),
        Column::new("identifier", ColumnType::Text),
        Column::new("parent", ColumnType::Text),
        Column::new("jsonPath", ColumnType::Text),
    ],
    relations: &[
        Relation::unique("GeometryFile_fk", "GeometryFile", "GeometryFile_pk"),
        Relation::shared("identifier", "ClientEntityGeometryField", "identifier"),
    ],
};

pub static RENDER_CONTROLLER_FILE: TableSchema = TableSchema {
    name: "RenderControllerFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::new("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

pub static RENDER_CONTROLLER: TableSchema = TableSchema {
    name: "RenderController",
    columns: &[
        Column::required("RenderControllerFile_fk", ColumnType::Integer),
        Column::new("identifier", ColumnType::Text),
    ],
    relations: &[
        Relation::unique(
            "RenderControllerFile_fk",
            "RenderControllerFile",
            "RenderControllerFile_pk",
        ),
        Relation::shared("identifier", "ClientEntityRenderControllerField", "identifier"),
    ],
};

pub static RENDER_CONTROLLER_TEXTURES_FIELD: TableSchema = TableSchema {
    name: "RenderControllerTexturesField",
    columns: &[
        Column::required("RenderController_fk", ColumnType::Integer),
        Column::new("ownerArray", ColumnType::Text),
        Column::new("shortName", ColumnType::Text),
    ],
    relations: &[Relation::unique(
        "RenderController_fk",
        "RenderController",
        "RenderController_pk",
    )],
};

pub static RENDER_CONTROLLER_MATERIALS_FIELD: TableSchema = TableSchema {
    name: "RenderControllerMaterialsField",
    columns: &[
        Column::required("RenderController_fk", ColumnType::Integer),
        Column::new("ownerArray", ColumnType::Text),
        Column::new("shortName", ColumnType::Text),
        // Star pattern matched against bone names
        Column::new("boneNamePattern", ColumnType::Text),
    ],
    relations: &[Relation::unique(
        "RenderController_fk",
        "RenderController",
        "RenderController_pk",
    )],
};

pub static RENDER_CONTROLLER_GEOMETRY_FIELD: TableSchema = TableSchema {
    name: "RenderControllerGeometryField",
    columns: &[
        Column::required("RenderController_fk", ColumnType::Integer),
        Column::new("ownerArray", ColumnType::Text),
        Column::new("shortName", ColumnType::Text),
    ],
    relations: &[Relation::unique(
        "RenderController_fk",
        "RenderController",
        "RenderController_pk",
    )],
};

// =============================================================================
// Resource pack: animations, items, sounds
// =============================================================================

pub static RP_ANIMATION_FILE: TableSchema = TableSchema {
    name: "RpAnimationFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::required("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

pub static RP_ANIMATION: TableSchema = TableSchema {
    name: "RpAnimation",
    columns: &[
        Column::required("RpAnimationFile_fk", ColumnType::Integer),
        Column::required("identifier", ColumnType::Text),
        Column::required("jsonPath", ColumnType::Text),
    ],
    relations: &[
        Relation::unique("RpAnimationFile_fk", "RpAnimationFile", "RpAnimationFile_pk"),
        Relation::shared("identifier", "ClientEntityAnimationField", "identifier"),
    ],
};

pub static RP_ANIMATION_PARTICLE_EFFECT: TableSchema = TableSchema {
    name: "RpAnimationParticleEffect",
    columns: &[
        Column::required("RpAnimation_fk", ColumnType::Integer),
        Column::required("shortName", ColumnType::Text),
        Column::required("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("RpAnimation_fk", "RpAnimation", "RpAnimation_pk")],
};

pub static RP_ANIMATION_SOUND_EFFECT: TableSchema = TableSchema {
    name: "RpAnimationSoundEffect",
    columns: &[
        Column::required("RpAnimation_fk", ColumnType::Integer),
        Column::required("shortName", ColumnType::Text),
        Column::required("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique("RpAnimation_fk", "RpAnimation", "RpAnimation_pk")],
};

pub static RP_ITEM_FILE: TableSchema = TableSchema {
    name: "RpItemFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::required("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

pub static RP_ITEM: TableSchema = TableSchema {
    name: "RpItem",
    columns: &[
        Column::required("RpItemFile_fk", ColumnType::Integer),
        Column::required("identifier", ColumnType::Text),
        Column::new("icon", ColumnType::Text),
    ],
    relations: &[Relation::unique("RpItemFile_fk", "RpItemFile", "RpItemFile_pk")],
};

pub static SOUND_FILE: TableSchema = TableSchema {
    name: "SoundFile",
    columns: &[
        Column::new("ResourcePack_fk", ColumnType::Integer),
        Column::required("path", ColumnType::Path),
        // Path relative to the pack, without the extension
        Column::required("identifier", ColumnType::Text),
    ],
    relations: &[Relation::unique("ResourcePack_fk", "ResourcePack", "ResourcePack_pk")],
};

// =============================================================================
// Behavior pack
// =============================================================================

pub static ENTITY_FILE: TableSchema = TableSchema {
    name: "EntityFile",
    columns: &[
        Column::new("BehaviorPack_fk", ColumnType::Integer),
        Column::new("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("BehaviorPack_fk", "BehaviorPack", "BehaviorPack_pk")],
};

pub static ENTITY: TableSchema = TableSchema {
    name: "Entity",
    columns: &[
        Column::required("EntityFile_fk", ColumnType::Integer),
        Column::new("identifier", ColumnType::Text),
    ],
    relations: &[
        Relation::unique("EntityFile_fk", "EntityFile", "EntityFile_pk"),
        Relation::shared("identifier", "ClientEntity", "identifier"),
    ],
};

pub static BP_ANIMATION_CONTROLLER_FILE: TableSchema = TableSchema {
    name: "BpAnimationControllerFile",
    columns: &[
        Column::new("BehaviorPack_fk", ColumnType::Integer),
        Column::required("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("BehaviorPack_fk", "BehaviorPack", "BehaviorPack_pk")],
};

pub static BP_ANIMATION_CONTROLLER: TableSchema = TableSchema {
    name: "BpAnimationController",
    columns: &[
        Column::required("BpAnimationControllerFile_fk", ColumnType::Integer),
        Column::required("identifier", ColumnType::Text),
        Column::required("jsonPath", ColumnType::Text),
    ],
    relations: &[Relation::unique(
        "BpAnimationControllerFile_fk",
        "BpAnimationControllerFile",
        "BpAnimationControllerFile_pk",
    )],
};

pub static BP_ITEM_FILE: TableSchema = TableSchema {
    name: "BpItemFile",
    columns: &[
        Column::new("BehaviorPack_fk", ColumnType::Integer),
        Column::required("path", ColumnType::Path),
    ],
    relations: &[Relation::unique("BehaviorPack_fk", "BehaviorPack", "BehaviorPack_pk")],
};

pub static BP_ITEM: TableSchema = TableSchema {
    name: "BpItem",
    columns: &[
        Column::required("BpItemFile_fk", ColumnType::Integer),
        Column::required("identifier", ColumnType::Text),
        // Either "1.10" or "1.16.100", picked from format_version
        Column::required("parserVersion", ColumnType::Text).with_default("'1.10'"),
        // Only present on 1.16.100+ items
        Column::new("texture", ColumnType::Text),
    ],
    relations: &[
        Relation::unique("BpItemFile_fk", "BpItemFile", "BpItemFile_pk"),
        Relation::shared("identifier", "RpItem", "identifier"),
    ],
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All built-in table schemas in registration order (parents first)
pub static ALL_TABLES: &[&TableSchema] = &[
    // Containers
    &RESOURCE_PACK,
    &BEHAVIOR_PACK,
    // Resource pack
    &CLIENT_ENTITY_FILE,
    &CLIENT_ENTITY,
    &CLIENT_ENTITY_RENDER_CONTROLLER_FIELD,
    &CLIENT_ENTITY_GEOMETRY_FIELD,
    &CLIENT_ENTITY_TEXTURE_FIELD,
    &CLIENT_ENTITY_MATERIAL_FIELD,
    &CLIENT_ENTITY_ANIMATION_FIELD,
    &GEOMETRY_FILE,
    &GEOMETRY,
    &RENDER_CONTROLLER_FILE,
    &RENDER_CONTROLLER,
    &RENDER_CONTROLLER_TEXTURES_FIELD,
    &RENDER_CONTROLLER_MATERIALS_FIELD,
    &RENDER_CONTROLLER_GEOMETRY_FIELD,
    &RP_ANIMATION_FILE,
    &RP_ANIMATION,
    &RP_ANIMATION_PARTICLE_EFFECT,
    &RP_ANIMATION_SOUND_EFFECT,
    &RP_ITEM_FILE,
    &RP_ITEM,
    &SOUND_FILE,
    // Behavior pack
    &ENTITY_FILE,
    &ENTITY,
    &BP_ANIMATION_CONTROLLER_FILE,
    &BP_ANIMATION_CONTROLLER,
    &BP_ITEM_FILE,
    &BP_ITEM,
];

/// Get a built-in table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all built-in table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_unique() {
        let names = table_names();
        let set: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), set.len());
    }

    #[test]
    fn test_parents_registered_first() {
        for (idx, table) in ALL_TABLES.iter().enumerate() {
            for parent in table.parents() {
                let parent_idx = ALL_TABLES
                    .iter()
                    .position(|t| t.name == parent)
                    .unwrap_or_else(|| panic!("{} references unknown {}", table.name, parent));
                assert!(parent_idx < idx, "{} registered before {}", table.name, parent);
            }
        }
    }

    #[test]
    fn test_relation_columns_exist() {
        for table in ALL_TABLES {
            for decl in table.declarations() {
                let target = get_table(decl.to_table).unwrap();
                assert!(table.has_column(decl.from_column), "{}.{}", table.name, decl.from_column);
                assert!(target.has_column(decl.to_column), "{}.{}", target.name, decl.to_column);
            }
        }
    }
}
