//! Names of the back-office tables.

pub const PRODUCTS: &str = "Productos";
pub const INVENTORY: &str = "Inventario";
pub const PRICE_TIERS: &str = "Variedades";
pub const IMAGES: &str = "Imagenes";
pub const CATEGORIES: &str = "Categorias";
pub const ICONS: &str = "Iconos";
pub const COLORS: &str = "Colores";
pub const AGENCIES: &str = "Agencias";
pub const SALE_HEADERS: &str = "Ventas";
pub const SALE_LINES: &str = "VentasDetalle";
