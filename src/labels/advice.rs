//! Static agronomic advice keyed by localized condition name.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiseaseAdvice {
    pub causes: &'static [&'static str],
    pub treatment: &'static [&'static str],
    pub prevention: &'static [&'static str],
}

pub static GENERIC_ADVICE: DiseaseAdvice = DiseaseAdvice {
    causes: &["Información específica no disponible para esta enfermedad"],
    treatment: &[
        "Consultar con un especialista en fitopatología",
        "Aplicar prácticas generales de manejo de enfermedades",
        "Eliminar partes infectadas",
        "Mejorar condiciones de crecimiento",
    ],
    prevention: &[
        "Mantener buena higiene en el cultivo",
        "Inspeccionar regularmente las plantas",
        "Aplicar tratamientos preventivos",
        "Mantener plantas bien nutridas e hidratadas",
    ],
};

static ADVICE: &[(&str, DiseaseAdvice)] = &[
    (
        "Sana",
        DiseaseAdvice {
            causes: &[],
            treatment: &[
                "La planta está saludable. Continúa con el cuidado regular.",
            ],
            prevention: &[
                "Mantén un riego adecuado",
                "Proporciona nutrientes balanceados",
                "Inspecciona regularmente las hojas",
                "Mantén buena circulación de aire",
            ],
        },
    ),
    (
        "Sarna del Manzano",
        DiseaseAdvice {
            causes: &[
                "Hongo Venturia inaequalis",
                "Condiciones húmedas y frescas en primavera",
                "Hojas infectadas del año anterior",
                "Falta de circulación de aire",
            ],
            treatment: &[
                "Aplicar fungicidas preventivos en primavera (azufre, cobre)",
                "Eliminar y destruir hojas infectadas",
                "Podar para mejorar la circulación de aire",
                "Aplicar fungicidas sistémicos si la infección es grave",
            ],
            prevention: &[
                "Recoger y destruir hojas caídas en otoño",
                "Podar árboles para mejorar la circulación",
                "Aplicar tratamientos preventivos antes de la brotación",
            ],
        },
    ),
    (
        "Podredumbre Negra",
        DiseaseAdvice {
            causes: &[
                "Hongo Guignardia bidwellii",
                "Heridas en frutos o hojas",
                "Alta humedad y temperatura",
                "Frutas dañadas o agrietadas",
            ],
            treatment: &[
                "Eliminar y destruir frutos y hojas infectadas",
                "Aplicar fungicidas protectores (mancozeb, captan)",
                "Podar para mejorar la circulación",
                "Evitar heridas en frutos durante el manejo",
            ],
            prevention: &[
                "Controlar insectos que causan heridas",
                "Mantener buena higiene en el huerto",
                "Aplicar tratamientos preventivos durante la temporada de crecimiento",
            ],
        },
    ),
    (
        "Roya del Manzano",
        DiseaseAdvice {
            causes: &[
                "Hongo Gymnosporangium juniperi-virginianae",
                "Presencia de enebros cercanos (hospedero alternativo)",
                "Condiciones húmedas en primavera",
                "Rocío persistente en las hojas",
            ],
            treatment: &[
                "Aplicar fungicidas preventivos en primavera",
                "Eliminar enebros cercanos si es posible",
                "Podar para mejorar la circulación de aire",
                "Aplicar tratamientos con azufre o cobre",
            ],
            prevention: &[
                "Eliminar o tratar enebros cercanos",
                "Aplicar fungicidas antes de la aparición de síntomas",
                "Mantener buena circulación de aire",
            ],
        },
    ),
    (
        "Oídio",
        DiseaseAdvice {
            causes: &[
                "Hongos del género Erysiphe, Podosphaera",
                "Alta humedad relativa (no necesariamente lluvia)",
                "Temperaturas moderadas (15-25°C)",
                "Falta de circulación de aire",
            ],
            treatment: &[
                "Aplicar fungicidas específicos (azufre, bicarbonato de potasio)",
                "Mejorar la circulación de aire mediante poda",
                "Evitar riego por aspersión en las hojas",
                "Aplicar aceite de neem como tratamiento orgánico",
            ],
            prevention: &[
                "Plantar con espaciado adecuado",
                "Podar regularmente para mejorar la circulación",
                "Evitar exceso de nitrógeno",
                "Aplicar tratamientos preventivos en condiciones favorables",
            ],
        },
    ),
    (
        "Mancha Bacteriana",
        DiseaseAdvice {
            causes: &[
                "Bacteria Xanthomonas spp.",
                "Heridas en hojas o frutos",
                "Alta humedad y temperatura",
                "Salpicaduras de agua contaminada",
            ],
            treatment: &[
                "Aplicar productos a base de cobre",
                "Eliminar y destruir partes infectadas",
                "Evitar riego por aspersión",
                "Usar bactericidas específicos si están disponibles",
            ],
            prevention: &[
                "Usar semillas certificadas libres de enfermedades",
                "Rotar cultivos",
                "Evitar trabajar las plantas cuando están húmedas",
                "Desinfectar herramientas regularmente",
            ],
        },
    ),
    (
        "Tizón Temprano",
        DiseaseAdvice {
            causes: &[
                "Hongo Alternaria solani",
                "Condiciones cálidas y húmedas",
                "Estrés hídrico seguido de lluvia",
                "Hojas viejas y debilitadas",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (clorotalonil, mancozeb)",
                "Eliminar hojas infectadas",
                "Mantener riego constante para evitar estrés",
                "Aplicar fungicidas sistémicos si es necesario",
            ],
            prevention: &[
                "Rotar cultivos (no plantar solanáceas consecutivamente)",
                "Mantener plantas bien nutridas",
                "Eliminar residuos de cultivos anteriores",
                "Aplicar tratamientos preventivos al inicio de la temporada",
            ],
        },
    ),
    (
        "Tizón Tardío",
        DiseaseAdvice {
            causes: &[
                "Hongo Phytophthora infestans",
                "Condiciones frías y húmedas",
                "Rocío persistente en las hojas",
                "Alta humedad relativa",
            ],
            treatment: &[
                "Aplicar fungicidas sistémicos inmediatamente (metalaxil, cimoxanil)",
                "Eliminar y destruir todas las partes infectadas",
                "Mejorar el drenaje del suelo",
                "Reducir la humedad alrededor de las plantas",
            ],
            prevention: &[
                "Usar variedades resistentes",
                "Aplicar tratamientos preventivos en condiciones favorables",
                "Evitar riego por aspersión",
                "Mantener buena circulación de aire",
            ],
        },
    ),
    (
        "Moho de la Hoja",
        DiseaseAdvice {
            causes: &[
                "Hongo Passalora fulva",
                "Alta humedad relativa",
                "Temperaturas moderadas",
                "Falta de circulación de aire",
            ],
            treatment: &[
                "Aplicar fungicidas específicos (azoxistrobina, clorotalonil)",
                "Mejorar la circulación de aire mediante poda",
                "Reducir la humedad relativa",
                "Eliminar hojas gravemente infectadas",
            ],
            prevention: &[
                "Usar variedades resistentes",
                "Mantener buena circulación de aire",
                "Evitar exceso de nitrógeno",
                "Aplicar tratamientos preventivos",
            ],
        },
    ),
    (
        "Mancha de Septoria",
        DiseaseAdvice {
            causes: &[
                "Hongo Septoria lycopersici",
                "Condiciones húmedas",
                "Salpicaduras de agua del suelo",
                "Hojas viejas infectadas",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (mancozeb, clorotalonil)",
                "Eliminar hojas infectadas",
                "Evitar riego por aspersión",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Rotar cultivos",
                "Eliminar residuos de cultivos anteriores",
                "Usar acolchado para evitar salpicaduras",
                "Mantener plantas bien espaciadas",
            ],
        },
    ),
    (
        "Ácaros (Araña Roja)",
        DiseaseAdvice {
            causes: &[
                "Ácaros Tetranychus urticae",
                "Condiciones secas y cálidas",
                "Falta de depredadores naturales",
                "Plantas estresadas",
            ],
            treatment: &[
                "Aplicar acaricidas específicos (abamectina, aceite de neem)",
                "Aumentar la humedad relativa",
                "Usar jabón insecticida",
                "Introducir depredadores naturales (ácaros fitoseidos)",
            ],
            prevention: &[
                "Mantener alta humedad relativa",
                "Inspeccionar regularmente las plantas",
                "Evitar exceso de nitrógeno",
                "Mantener plantas bien hidratadas",
            ],
        },
    ),
    (
        "Mancha Objetivo",
        DiseaseAdvice {
            causes: &[
                "Hongo Corynespora cassiicola",
                "Alta humedad y temperatura",
                "Heridas en las hojas",
                "Residuos de cultivos infectados",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (clorotalonil, azoxistrobina)",
                "Eliminar hojas infectadas",
                "Mejorar la circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Eliminar residuos de cultivos",
                "Rotar cultivos",
                "Mantener buena circulación de aire",
                "Evitar heridas en las plantas",
            ],
        },
    ),
    (
        "Virus del Mosaico del Tomate",
        DiseaseAdvice {
            causes: &[
                "Virus ToMV (Tomato Mosaic Virus)",
                "Transmisión por contacto",
                "Herramientas contaminadas",
                "Semillas infectadas",
            ],
            treatment: &[
                "No hay tratamiento curativo",
                "Eliminar y destruir plantas infectadas inmediatamente",
                "Desinfectar todas las herramientas",
                "Usar variedades resistentes en el futuro",
            ],
            prevention: &[
                "Usar semillas certificadas",
                "Desinfectar herramientas regularmente",
                "Lavar manos antes de trabajar con plantas",
                "Eliminar plantas infectadas rápidamente",
            ],
        },
    ),
    (
        "Virus del Enrollamiento Amarillo",
        DiseaseAdvice {
            causes: &[
                "Virus TYLCV (Tomato Yellow Leaf Curl Virus)",
                "Transmisión por mosca blanca (Bemisia tabaci)",
                "Plantas infectadas cercanas",
                "Falta de control de insectos",
            ],
            treatment: &[
                "No hay tratamiento curativo",
                "Eliminar plantas infectadas",
                "Controlar mosca blanca con insecticidas",
                "Usar barreras físicas (mallas)",
            ],
            prevention: &[
                "Controlar mosca blanca desde el inicio",
                "Usar variedades resistentes",
                "Eliminar plantas hospederas de mosca blanca",
                "Usar mallas protectoras",
            ],
        },
    ),
    (
        "Roya Común",
        DiseaseAdvice {
            causes: &[
                "Hongo Puccinia sorghi",
                "Condiciones húmedas y frescas",
                "Presencia de hospederos alternativos",
                "Alta densidad de plantas",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (azoxistrobina, tebuconazol)",
                "Eliminar hojas gravemente infectadas",
                "Mejorar la circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Usar variedades resistentes",
                "Rotar cultivos",
                "Mantener espaciado adecuado",
                "Aplicar tratamientos preventivos en primavera",
            ],
        },
    ),
    (
        "Tizón del Norte",
        DiseaseAdvice {
            causes: &[
                "Hongo Exserohilum turcicum",
                "Condiciones cálidas y húmedas",
                "Rocío persistente",
                "Alta densidad de plantas",
            ],
            treatment: &[
                "Aplicar fungicidas sistémicos (azoxistrobina, propiconazol)",
                "Eliminar hojas infectadas",
                "Mejorar la circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Usar variedades resistentes",
                "Rotar cultivos",
                "Mantener espaciado adecuado",
                "Eliminar residuos de cultivos",
            ],
        },
    ),
    (
        "Mancha de Cercospora",
        DiseaseAdvice {
            causes: &[
                "Hongo Cercospora zeae-maydis",
                "Condiciones cálidas y húmedas",
                "Alta humedad relativa",
                "Residuos de cultivos infectados",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (clorotalonil, azoxistrobina)",
                "Eliminar hojas infectadas",
                "Mejorar la circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Rotar cultivos",
                "Eliminar residuos de cultivos",
                "Mantener espaciado adecuado",
                "Aplicar tratamientos preventivos",
            ],
        },
    ),
    (
        "Yesca (Sarampión Negro)",
        DiseaseAdvice {
            causes: &[
                "Hongo Phaeomoniella chlamydospora",
                "Heridas en la vid",
                "Condiciones de estrés",
                "Material de propagación infectado",
            ],
            treatment: &[
                "No hay tratamiento curativo efectivo",
                "Podar y eliminar partes infectadas",
                "Mejorar las condiciones de crecimiento",
                "Aplicar fungicidas preventivos en heridas",
            ],
            prevention: &[
                "Usar material de propagación certificado",
                "Evitar heridas en la vid",
                "Desinfectar herramientas de poda",
                "Mantener plantas bien nutridas",
            ],
        },
    ),
    (
        "Tizón de la Hoja",
        DiseaseAdvice {
            causes: &[
                "Hongo Isariopsis griseola",
                "Condiciones húmedas",
                "Alta humedad relativa",
                "Residuos de cultivos infectados",
            ],
            treatment: &[
                "Aplicar fungicidas protectores (mancozeb, clorotalonil)",
                "Eliminar hojas infectadas",
                "Mejorar la circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
            prevention: &[
                "Rotar cultivos",
                "Eliminar residuos de cultivos",
                "Mantener buena circulación de aire",
                "Aplicar tratamientos preventivos",
            ],
        },
    ),
    (
        "Huanglongbing (Enverdecimiento)",
        DiseaseAdvice {
            causes: &[
                "Bacteria Candidatus Liberibacter",
                "Transmisión por psílido asiático de los cítricos",
                "Material de propagación infectado",
                "Falta de control de insectos vectores",
            ],
            treatment: &[
                "No hay tratamiento curativo",
                "Eliminar árboles infectados para prevenir propagación",
                "Controlar psílidos con insecticidas",
                "Usar material de propagación certificado",
            ],
            prevention: &[
                "Controlar psílidos desde el inicio",
                "Usar material de propagación certificado",
                "Inspeccionar regularmente los árboles",
                "Eliminar árboles infectados inmediatamente",
            ],
        },
    ),
    (
        "Quemadura de la Hoja",
        DiseaseAdvice {
            causes: &[
                "Bacteria Xylella fastidiosa",
                "Transmisión por insectos chupadores",
                "Heridas en las plantas",
                "Condiciones de estrés hídrico",
            ],
            treatment: &[
                "No hay tratamiento curativo efectivo",
                "Eliminar partes gravemente infectadas",
                "Controlar insectos vectores",
                "Mantener plantas bien hidratadas",
            ],
            prevention: &[
                "Controlar insectos vectores",
                "Usar material de propagación certificado",
                "Mantener plantas bien hidratadas",
                "Evitar heridas en las plantas",
            ],
        },
    ),
];

/// Exact name first, then a case-insensitive partial match in either
/// direction, else [`GENERIC_ADVICE`].
pub fn advice_for(condition: &str) -> &'static DiseaseAdvice {
    if let Some((_, advice)) = ADVICE.iter().find(|(name, _)| *name == condition) {
        return advice;
    }

    let needle = condition.trim().to_lowercase();
    if needle.is_empty() {
        return &GENERIC_ADVICE;
    }

    ADVICE
        .iter()
        .find(|(name, _)| {
            let name = name.to_lowercase();
            needle.contains(&name) || name.contains(&needle)
        })
        .map(|(_, advice)| advice)
        .unwrap_or(&GENERIC_ADVICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::tables::CONDITION_NAMES;

    #[test]
    fn test_every_localized_condition_has_advice() {
        for (_, localized) in CONDITION_NAMES {
            let advice = advice_for(localized);
            assert_ne!(advice, &GENERIC_ADVICE, "no advice for {localized}");
        }
    }

    #[test]
    fn test_healthy_has_no_causes() {
        let advice = advice_for("Sana");
        assert!(advice.causes.is_empty());
        assert_eq!(advice.prevention.len(), 4);
    }

    #[test]
    fn test_partial_match_ignores_case() {
        assert_eq!(advice_for("tizón tardío severo"), advice_for("Tizón Tardío"));
    }

    #[test]
    fn test_unknown_condition_gets_generic_advice() {
        assert_eq!(advice_for("Black Leaf Streak"), &GENERIC_ADVICE);
        assert_eq!(advice_for(""), &GENERIC_ADVICE);
    }
}
