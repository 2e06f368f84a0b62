mod csv_loading;
mod ratio_ranking;
mod store_operations;
