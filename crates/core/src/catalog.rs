use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Location {
    pub id: LocationId,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub default_zoom: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Venue {
    pub name: String,
    pub location: LocationId,
    pub price_eur: u32,
    pub rating: u8,
    pub cuisine: String,
    pub description: String,
    pub signature: String,
}

impl Venue {
    pub fn stars(&self) -> String {
        "★".repeat(usize::from(self.rating))
    }
}

/// Country and nationality terms that identify a supported location without
/// consulting the oracle.
const LOCATION_ALIASES: &[(&str, &str)] = &[
    ("france", "paris"),
    ("french", "paris"),
    ("finland", "helsinki"),
    ("finnish", "helsinki"),
    ("spain", "madrid"),
    ("spanish", "madrid"),
    ("italy", "rome"),
    ("italian", "rome"),
    ("uk", "london"),
    ("england", "london"),
    ("britain", "london"),
    ("british", "london"),
    ("germany", "berlin"),
    ("german", "berlin"),
    ("austria", "vienna"),
    ("austrian", "vienna"),
    ("czech", "prague"),
    ("czechia", "prague"),
    ("sweden", "stockholm"),
    ("swedish", "stockholm"),
    ("denmark", "copenhagen"),
    ("danish", "copenhagen"),
    ("norway", "oslo"),
    ("norwegian", "oslo"),
    ("ireland", "dublin"),
    ("irish", "dublin"),
    ("portugal", "lisbon"),
    ("portuguese", "lisbon"),
    ("netherlands", "amsterdam"),
    ("dutch", "amsterdam"),
    ("holland", "amsterdam"),
    ("switzerland", "zurich"),
    ("swiss", "zurich"),
];

/// Read-only reference data: supported locations and the venues bookable in
/// each of them.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    locations: Vec<Location>,
    venues: Vec<Venue>,
}

impl Catalog {
    pub fn new(locations: Vec<Location>, venues: Vec<Venue>) -> Self {
        Self { locations, venues }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.id.as_str() == id)
    }

    pub fn venues_in(&self, location: &LocationId) -> Vec<&Venue> {
        self.venues.iter().filter(|venue| &venue.location == location).collect()
    }

    pub fn find_venue(&self, location: &LocationId, name: &str) -> Option<&Venue> {
        self.venues.iter().find(|venue| &venue.location == location && venue.name == name)
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(|location| location.id.as_str()).collect()
    }

    /// Lexical resolution tiers: location name contained in the utterance,
    /// then the alias table. Never consults the oracle.
    pub fn match_location(&self, text: &str) -> Option<&Location> {
        let lowered = text.to_lowercase();

        if let Some(location) =
            self.locations.iter().find(|location| lowered.contains(location.id.as_str()))
        {
            return Some(location);
        }

        LOCATION_ALIASES
            .iter()
            .find(|(term, _)| lowered.contains(term))
            .and_then(|(_, id)| self.location(id))
    }

    /// Validates a single oracle-returned token against the known location
    /// ids; anything that is not already in the catalog is rejected.
    pub fn location_from_token(&self, token: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|location| token == location.id.as_str() || token.contains(location.id.as_str()))
    }

    pub fn builtin() -> Self {
        let locations = vec![
            location("paris", "Paris", 48.8566, 2.3522),
            location("london", "London", 51.5074, -0.1278),
            location("rome", "Rome", 41.9028, 12.4964),
            location("barcelona", "Barcelona", 41.3851, 2.1734),
            location("amsterdam", "Amsterdam", 52.3676, 4.9041),
            location("berlin", "Berlin", 52.52, 13.405),
            location("vienna", "Vienna", 48.2082, 16.3738),
            location("prague", "Prague", 50.0755, 14.4378),
            location("stockholm", "Stockholm", 59.3293, 18.0686),
            location("helsinki", "Helsinki", 60.1699, 24.9384),
            location("copenhagen", "Copenhagen", 55.6761, 12.5683),
            location("oslo", "Oslo", 59.9139, 10.7522),
            location("dublin", "Dublin", 53.3498, -6.2603),
            location("lisbon", "Lisbon", 38.7223, -9.1393),
            location("madrid", "Madrid", 40.4168, -3.7038),
            location("zurich", "Zurich", 47.3769, 8.5417),
        ];

        let venues = vec![
            venue("Le Cinq", "paris", 380, 3, "French",
                "Elegant dining at Four Seasons George V. Classic French cuisine reimagined with modern techniques.",
                "Brittany blue lobster, duck foie gras"),
            venue("Septime", "paris", 95, 1, "Modern French",
                "Hip, intimate spot in the 11th. Seasonal tasting menus with natural wines.",
                "Market-driven dishes, fermented vegetables"),
            venue("Le Clarence", "paris", 320, 2, "French",
                "Stunning 19th-century mansion. Refined French cuisine by Christophe Pelé.",
                "Langoustine, aged Wagyu beef"),
            venue("Core by Clare Smyth", "london", 195, 3, "British",
                "Elegant Notting Hill restaurant celebrating British produce and heritage.",
                "Potato and roe, lamb carrot"),
            venue("The Clove Club", "london", 150, 1, "Modern British",
                "Inventive tasting menus in a former town hall in Shoreditch.",
                "Buttermilk fried chicken, raw Orkney scallop"),
            venue("Kitchen Table", "london", 250, 2, "British",
                "Intimate 20-seat counter dining behind Bubbledogs.",
                "Chef's choice tasting menu"),
            venue("La Pergola", "rome", 290, 3, "Italian",
                "Rooftop fine dining at Rome Cavalieri with panoramic views.",
                "Roman artichoke, Mediterranean red mullet"),
            venue("Il Pagliaccio", "rome", 180, 2, "Creative Italian",
                "Intimate restaurant with creative Mediterranean cuisine.",
                "Squid carbonara, suckling pig"),
            venue("Pipero", "rome", 120, 1, "Roman",
                "Contemporary Roman cuisine in elegant surroundings.",
                "Cacio e pepe, Roman-style tripe"),
            venue("ABaC", "barcelona", 210, 3, "Catalan",
                "Avant-garde Catalan cuisine by Jordi Cruz. Theatrical presentations.",
                "Sea urchin, Iberian pork"),
            venue("Cinc Sentits", "barcelona", 145, 1, "Catalan",
                "Modern Catalan cuisine celebrating local producers.",
                "Seasonal Catalan tasting menu"),
            venue("Cocina Hermanos Torres", "barcelona", 195, 2, "Modern Spanish",
                "Open kitchen concept by twin chef brothers.",
                "Rice dishes, Iberian ham"),
            venue("De Librije Amsterdam", "amsterdam", 225, 2, "Dutch",
                "Refined Dutch cuisine in the Waldorf Astoria.",
                "North Sea fish, Dutch vegetables"),
            venue("&moshik", "amsterdam", 195, 2, "Creative",
                "Playful, creative cuisine with unexpected flavor combinations.",
                "Surprise tasting menu"),
            venue("Rutz", "berlin", 198, 3, "Modern German",
                "Innovative German cuisine focused on regional ingredients.",
                "Brandenburg vegetables, German wines"),
            venue("Facil", "berlin", 165, 2, "European",
                "Elegant rooftop restaurant at The Mandala Hotel.",
                "Seasonal European dishes"),
            venue("Steirereck", "vienna", 210, 2, "Austrian",
                "Iconic Austrian restaurant in Stadtpark. Contemporary Alpine cuisine.",
                "Char with beeswax, wild herbs"),
            venue("Amador", "vienna", 245, 3, "Creative",
                "Spanish chef Juan Amador brings avant-garde techniques to Vienna.",
                "Creative tasting journey"),
            venue("La Degustation", "prague", 165, 1, "Czech",
                "Bohemian cuisine reimagined with French techniques.",
                "Czech classics modernized"),
            venue("Field", "prague", 120, 1, "Modern Czech",
                "Farm-to-table focus with Czech ingredients.",
                "Seasonal Czech produce"),
            venue("Frantzén", "stockholm", 350, 3, "Nordic",
                "Multi-floor dining experience. Swedish ingredients with global influences.",
                "Nordic tasting journey"),
            venue("Oaxen Krog", "stockholm", 225, 2, "Swedish",
                "Waterfront restaurant on Djurgården. Refined Nordic cuisine.",
                "Swedish seasonal menu"),
            venue("Olo", "helsinki", 175, 1, "Nordic",
                "Finnish ingredients showcased with Nordic creativity.",
                "Finnish archipelago fish, forest berries"),
            venue("Palace", "helsinki", 195, 1, "Finnish",
                "Classic Helsinki fine dining with harbor views.",
                "Finnish classics refined"),
            venue("Noma", "copenhagen", 450, 3, "New Nordic",
                "The legendary restaurant that defined New Nordic cuisine.",
                "Seasonal themes: ocean, vegetable, game & forest"),
            venue("Geranium", "copenhagen", 400, 3, "Nordic",
                "Overlooking Fælledparken. Pure, aesthetic Nordic cuisine.",
                "Vegetable-forward tasting menu"),
            venue("Maaemo", "oslo", 380, 3, "Norwegian",
                "Pure Norwegian terroir. Ingredients from Norwegian nature.",
                "Norwegian landscape on a plate"),
            venue("Rest", "oslo", 145, 1, "Modern Nordic",
                "Zero-waste philosophy with creative Nordic dishes.",
                "Sustainable tasting menu"),
            venue("Chapter One", "dublin", 135, 1, "Irish",
                "Basement restaurant in the Dublin Writers Museum.",
                "Irish beef, Atlantic seafood"),
            venue("Liath", "dublin", 175, 2, "Modern Irish",
                "Intimate restaurant in Blackrock. Bold Irish cuisine.",
                "Irish ingredients reimagined"),
            venue("Belcanto", "lisbon", 225, 2, "Portuguese",
                "José Avillez flagship. Portuguese cuisine with creative flair.",
                "Codfish, suckling pig"),
            venue("Alma", "lisbon", 145, 1, "Portuguese",
                "Contemporary Portuguese in a historic setting.",
                "Seafood rice, Portuguese classics"),
            venue("DiverXO", "madrid", 295, 3, "Avant-garde",
                "Dabiz Muñoz wild, theatrical dining experience.",
                "Unexpected flavor explosions"),
            venue("Smoked Room", "madrid", 180, 2, "Creative Spanish",
                "Smoke and fire cooking techniques.",
                "Smoked and grilled specialties"),
            venue("The Restaurant", "zurich", 320, 2, "French",
                "The Dolder Grand flagship. Classic French with Swiss precision.",
                "French classics, Swiss ingredients"),
            venue("Ecco Zurich", "zurich", 250, 2, "Creative",
                "Creative European cuisine at Atlantis by Giardino.",
                "Innovative tasting menus"),
        ];

        Self::new(locations, venues)
    }
}

fn location(id: &str, display_name: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        id: LocationId(id.to_string()),
        display_name: display_name.to_string(),
        latitude,
        longitude,
        default_zoom: 13,
    }
}

fn venue(
    name: &str,
    location: &str,
    price_eur: u32,
    rating: u8,
    cuisine: &str,
    description: &str,
    signature: &str,
) -> Venue {
    Venue {
        name: name.to_string(),
        location: LocationId(location.to_string()),
        price_eur,
        rating,
        cuisine: cuisine.to_string(),
        description: description.to_string(),
        signature: signature.to_string(),
    }
}
