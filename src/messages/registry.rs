// src/messages/registry.rs
//
// Catalog of the record tables a message may be attached to, keyed by
// canonical table name and by the request-parameter alias the old
// forms still send (idir=, idmr=, ...).

/// A table messages can target and the name of its primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    pub name: &'static str,
    pub key: &'static str,
    /// Request-parameter alias carrying the record key, if the table
    /// has one.
    pub alias: Option<&'static str>,
}

const TABLES: &[TableInfo] = &[
    TableInfo { name: "Users", key: "id", alias: None },
    TableInfo { name: "Blogs", key: "bl_index", alias: Some("blid") },
    // family-tree record tables
    TableInfo { name: "tblAR", key: "idar", alias: Some("idar") },
    TableInfo { name: "tblBP", key: "idbp", alias: Some("idbp") },
    TableInfo { name: "tblBR", key: "idbr", alias: Some("idbr") },
    TableInfo { name: "tblCP", key: "idcp", alias: Some("idcp") },
    TableInfo { name: "tblCR", key: "idcr", alias: Some("idcr") },
    TableInfo { name: "tblER", key: "ider", alias: Some("ider") },
    TableInfo { name: "tblHB", key: "idhb", alias: Some("idhb") },
    TableInfo { name: "tblHL", key: "idhl", alias: Some("idhl") },
    TableInfo { name: "tblIR", key: "idir", alias: Some("idir") },
    TableInfo { name: "tblLR", key: "idlr", alias: Some("idlr") },
    TableInfo { name: "tblMR", key: "idmr", alias: Some("idmr") },
    TableInfo { name: "tblMS", key: "idms", alias: Some("idms") },
    TableInfo { name: "tblNR", key: "idnr", alias: Some("idnr") },
    TableInfo { name: "tblNX", key: "idnx", alias: Some("idnx") },
    TableInfo { name: "tblRM", key: "idrm", alias: Some("idrm") },
    TableInfo { name: "tblSR", key: "idsr", alias: Some("idsr") },
    TableInfo { name: "tblSX", key: "idsx", alias: Some("idsx") },
    TableInfo { name: "tblTC", key: "idtc", alias: Some("idtc") },
    TableInfo { name: "tblTD", key: "idtd", alias: Some("idtd") },
    TableInfo { name: "tblTL", key: "idtl", alias: Some("idtl") },
    TableInfo { name: "tblTR", key: "idtr", alias: Some("idtr") },
];

/// Look a table up by its canonical name, case-insensitively.
pub fn by_name(name: &str) -> Option<&'static TableInfo> {
    TABLES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Look a table up by the request-parameter alias carrying its key.
pub fn by_alias(alias: &str) -> Option<&'static TableInfo> {
    TABLES
        .iter()
        .find(|t| t.alias.map_or(false, |a| a.eq_ignore_ascii_case(alias)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_resolve() {
        assert_eq!(by_name("Users").unwrap().key, "id");
        assert_eq!(by_name("users").unwrap().name, "Users");
        assert_eq!(by_name("tblIR").unwrap().key, "idir");
        assert!(by_name("tblZZ").is_none());
    }

    #[test]
    fn aliases_resolve_to_their_table() {
        assert_eq!(by_alias("idir").unwrap().name, "tblIR");
        assert_eq!(by_alias("IDMR").unwrap().name, "tblMR");
        assert_eq!(by_alias("blid").unwrap().name, "Blogs");
        assert!(by_alias("id").is_none());
    }
}
