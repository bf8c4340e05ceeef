//! Localized display names. Order matters: lookups take the first match.

pub const UNKNOWN_PLANT: &str = "Desconocida";

pub static PLANT_NAMES: &[(&str, &str)] = &[
    ("Apple", "Manzana"),
    ("Blueberry", "Arándano"),
    ("Cherry (including sour)", "Cereza"),
    ("Corn (maize)", "Maíz"),
    ("Grape", "Uva"),
    ("Orange", "Naranja"),
    ("Peach", "Durazno"),
    ("Pepper, bell", "Pimiento"),
    ("Potato", "Papa"),
    ("Raspberry", "Frambuesa"),
    ("Soybean", "Soja"),
    ("Squash", "Calabaza"),
    ("Strawberry", "Fresa"),
    ("Tomato", "Tomate"),
];

pub static CONDITION_NAMES: &[(&str, &str)] = &[
    ("healthy", "Sana"),
    ("Apple_scab", "Sarna del Manzano"),
    ("Black_rot", "Podredumbre Negra"),
    ("Cedar_apple_rust", "Roya del Manzano"),
    ("Powdery_mildew", "Oídio"),
    ("Bacterial_spot", "Mancha Bacteriana"),
    ("Early_blight", "Tizón Temprano"),
    ("Late_blight", "Tizón Tardío"),
    ("Leaf_Mold", "Moho de la Hoja"),
    ("Septoria_leaf_spot", "Mancha de Septoria"),
    ("Spider_mites Two-spotted_spider_mite", "Ácaros (Araña Roja)"),
    ("Target_Spot", "Mancha Objetivo"),
    ("Tomato_mosaic_virus", "Virus del Mosaico del Tomate"),
    ("Tomato_Yellow_Leaf_Curl_Virus", "Virus del Enrollamiento Amarillo"),
    ("Common_rust_", "Roya Común"),
    ("Northern_Leaf_Blight", "Tizón del Norte"),
    ("Cercospora_leaf_spot Gray_leaf_spot", "Mancha de Cercospora"),
    ("Esca_(Black_Measles)", "Yesca (Sarampión Negro)"),
    ("Leaf_blight_(Isariopsis_Leaf_Spot)", "Tizón de la Hoja"),
    ("Haunglongbing_(Citrus_greening)", "Huanglongbing (Enverdecimiento)"),
    ("Leaf_scorch", "Quemadura de la Hoja"),
];
