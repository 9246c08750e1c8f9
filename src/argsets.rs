pub struct ConfigureArgs {
    pub key: String,
    pub value: String,
}

pub struct ConfigGetArgs {
    pub key: String,
}

pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
